//! Stack growth for deep recursion.
//!
//! GraphQL nests selections, list literals, input objects and type
//! references without limit, and every stage that consumes them (parser,
//! validator, engine, IR printer) is a recursive walk. Those walks wrap
//! their recursive step in [`ensure_sufficient_stack`], which grows the
//! stack on demand instead of overflowing it.
//!
//! On `wasm32` the call is a passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the
/// red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_the_closure_result() {
        let result: Result<u32, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        // Far past what a 2MB test thread holds without growth.
        assert_eq!(depth(100_000), 100_000);
    }
}
