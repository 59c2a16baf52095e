use std::fmt;

/// The four stages of a frame, in execution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameStage {
    MotionUpdate,
    ClusterAssignment,
    GeometryPass,
    Present,
}

impl FrameStage {
    pub const ALL: [FrameStage; 4] = [
        FrameStage::MotionUpdate,
        FrameStage::ClusterAssignment,
        FrameStage::GeometryPass,
        FrameStage::Present,
    ];

    pub fn first() -> Self {
        FrameStage::MotionUpdate
    }

    pub fn next(self) -> Option<Self> {
        match self {
            FrameStage::MotionUpdate => Some(FrameStage::ClusterAssignment),
            FrameStage::ClusterAssignment => Some(FrameStage::GeometryPass),
            FrameStage::GeometryPass => Some(FrameStage::Present),
            FrameStage::Present => None,
        }
    }
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameStage::MotionUpdate => "motion update",
            FrameStage::ClusterAssignment => "cluster assignment",
            FrameStage::GeometryPass => "geometry pass",
            FrameStage::Present => "present",
        })
    }
}

/// Tracks progress through one frame. Stages must be entered in order and
/// none may be skipped.
#[derive(Debug, Default, Clone)]
pub struct StageTracker {
    current: Option<FrameStage>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters `stage`. Returns `false`, leaving the tracker unchanged, if it is
    /// not the stage after the current one.
    pub fn enter(&mut self, stage: FrameStage) -> bool {
        let expected = match self.current {
            None => Some(FrameStage::first()),
            Some(s) => s.next(),
        };
        if expected != Some(stage) {
            return false;
        }
        log::trace!("frame stage: {stage}");
        self.current = Some(stage);
        true
    }

    pub fn current(&self) -> Option<FrameStage> {
        self.current
    }

    /// Whether every stage ran.
    pub fn is_complete(&self) -> bool {
        self.current == Some(FrameStage::Present)
    }
}
