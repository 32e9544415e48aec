use std::fmt;

/// Lifecycle of one annotation run.
///
/// `Idle → Opened → Streaming → Finalizing → Closed` on success. Open
/// failures go `Idle → Failed → Closed`; streaming failures go
/// `Streaming → Failed → Finalizing → Closed` and still flush what was
/// collected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Opened,
    Streaming,
    Finalizing,
    Failed,
    Closed,
}

impl PipelineState {
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Opened)
                | (Idle, Failed)
                | (Opened, Streaming)
                | (Opened, Failed)
                | (Streaming, Finalizing)
                | (Streaming, Failed)
                | (Finalizing, Closed)
                | (Failed, Finalizing)
                | (Failed, Closed)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Opened => "opened",
            PipelineState::Streaming => "streaming",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Failed => "failed",
            PipelineState::Closed => "closed",
        };
        f.write_str(name)
    }
}
