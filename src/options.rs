//! Parser configuration.

/// Default ceiling on the size of one input, 50 MiB.
pub const MAX_INPUT_SIZE: usize = 50 * 1024 * 1024;

/// Options shared by every parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Inputs longer than this many bytes are rejected before parsing.
    pub max_input_size: usize,
    /// Number of worker threads used by [`parse_files`](crate::parse::parse_files).
    /// `0` means one per CPU.
    pub threads: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_input_size: MAX_INPUT_SIZE,
            threads: 0,
        }
    }
}

impl ParseOptions {
    /// The number of workers to start, resolving `0` to the CPU count.
    pub fn worker_count(&self) -> usize {
        match self.threads {
            0 => num_cpus::get(),
            num => num,
        }
    }

    /// Reads `SIE_MAX_INPUT_SIZE` and `SIE_PARSER_THREADS`, falling back to
    /// the defaults for unset or malformed values.
    pub fn from_env() -> Self {
        let defaults = ParseOptions::default();
        let max_input_size = std::env::var("SIE_MAX_INPUT_SIZE")
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .unwrap_or(defaults.max_input_size);
        let threads = std::env::var("SIE_PARSER_THREADS")
            .ok()
            .and_then(|num| num.parse::<usize>().ok())
            .filter(|&num| num > 0)
            .unwrap_or(defaults.threads);
        ParseOptions {
            max_input_size,
            threads,
        }
    }
}
