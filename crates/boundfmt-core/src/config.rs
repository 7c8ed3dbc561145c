//! Runtime render mode configuration.
//!
//! The mode is set via the `BOUNDFMT_MODE` environment variable:
//! - `compat` (default): an unrecognised conversion character ends its
//!   directive silently and scanning resumes right after it. This is the
//!   historical behavior of the engine.
//! - `strict`: the first unrecognised conversion aborts the render with
//!   [`RenderError::UnsupportedDirective`](crate::RenderError). Output
//!   produced before the bad directive stays in the buffer, terminated.
//!
//! Builds without the `std` feature never read the environment. They stay
//! on `compat` until [`set_render_mode`] installs another mode.

use core::sync::atomic::{AtomicU8, Ordering};

/// How the engine treats directives it does not implement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Skip unrecognised conversions without output or argument consumption.
    #[default]
    Compat,
    /// Reject unrecognised conversions with an error.
    Strict,
}

impl RenderMode {
    /// Parse from string (case-insensitive). Unknown spellings map to `Compat`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        let s = s.trim();
        if ["strict", "reject"]
            .iter()
            .any(|name| s.eq_ignore_ascii_case(name))
        {
            Self::Strict
        } else {
            Self::Compat
        }
    }

    /// Returns true if unrecognised conversions must be reported.
    #[must_use]
    pub const fn rejects_unknown(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compat => "compat",
            Self::Strict => "strict",
        }
    }
}

// Atomic cache: 0=unresolved, 1=Compat, 2=Strict, 255=resolving.
// A reentrant call that lands while the environment is being read sees the
// resolving state and gets Compat instead of blocking.
static CACHED_MODE: AtomicU8 = AtomicU8::new(0);

const MODE_UNRESOLVED: u8 = 0;
const MODE_COMPAT: u8 = 1;
const MODE_STRICT: u8 = 2;
const MODE_RESOLVING: u8 = 255;

fn mode_to_u8(mode: RenderMode) -> u8 {
    match mode {
        RenderMode::Compat => MODE_COMPAT,
        RenderMode::Strict => MODE_STRICT,
    }
}

fn u8_to_mode(v: u8) -> RenderMode {
    match v {
        MODE_STRICT => RenderMode::Strict,
        _ => RenderMode::Compat,
    }
}

#[cfg(feature = "std")]
fn mode_from_env() -> RenderMode {
    std::env::var("BOUNDFMT_MODE")
        .map(|v| RenderMode::from_str_loose(&v))
        .unwrap_or_default()
}

#[cfg(not(feature = "std"))]
fn mode_from_env() -> RenderMode {
    RenderMode::Compat
}

/// Get the configured render mode (reads the environment on first call,
/// caches thereafter).
#[must_use]
pub fn render_mode() -> RenderMode {
    let cached = CACHED_MODE.load(Ordering::Relaxed);

    if cached != MODE_UNRESOLVED && cached != MODE_RESOLVING {
        return u8_to_mode(cached);
    }
    if cached == MODE_RESOLVING {
        return RenderMode::Compat;
    }

    if CACHED_MODE
        .compare_exchange(
            MODE_UNRESOLVED,
            MODE_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_MODE.load(Ordering::Relaxed);
        return if v != MODE_UNRESOLVED && v != MODE_RESOLVING {
            u8_to_mode(v)
        } else {
            RenderMode::Compat
        };
    }

    let mode = mode_from_env();
    // A concurrent set_render_mode wins over the environment.
    let _ = CACHED_MODE.compare_exchange(
        MODE_RESOLVING,
        mode_to_u8(mode),
        Ordering::Release,
        Ordering::Relaxed,
    );
    u8_to_mode(CACHED_MODE.load(Ordering::Acquire))
}

/// Install a process-wide render mode, overriding the environment.
pub fn set_render_mode(mode: RenderMode) {
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
}
