#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Drawing,
}

impl CaptureState {
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing)
    }
}

pub fn can_transition(from: CaptureState, to: CaptureState) -> bool {
    matches!(
        (from, to),
        (CaptureState::Idle, CaptureState::Drawing) | (CaptureState::Drawing, CaptureState::Idle)
    ) || from == to
}
