/// Errors that can occur during Dormand–Prince integration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid time span: start {start}, end {end}")]
    InvalidSpan { start: f64, end: f64 },

    #[error("sample times must be finite, strictly increasing, and within the span")]
    InvalidGrid,

    #[error("a grid of {len} times exceeds the limit of {max_len}")]
    GridTooLarge { len: f64, max_len: usize },

    #[error("required step size {h:e} is below the resolution of t = {t}")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("exceeded {max_steps} steps at t = {t}")]
    TooManySteps { t: f64, max_steps: usize },
}
