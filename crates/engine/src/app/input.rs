#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Confirm,
    ToggleMusic,
    NextTrack,
    ZoomIn,
    ZoomOut,
    Quit,
}

const ACTION_COUNT: usize = 10;

/// Per-tick view of one key: whether it went down since the previous tick and
/// whether it is held right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub just_pressed: bool,
    pub is_down: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    /// Records a key transition. Repeated presses of a held key do not raise a
    /// new edge.
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn force_pressed(&mut self, action: InputAction) {
        let index = action.index();
        self.pressed[index] = true;
        self.down[index] = true;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn key_state(&self, action: InputAction) -> KeyState {
        let index = action.index();
        KeyState {
            just_pressed: self.pressed[index],
            is_down: self.down[index],
        }
    }

    pub(crate) fn clear_edges(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }

    pub(crate) fn clear_edges_for(&mut self, action: InputAction) {
        self.pressed[action.index()] = false;
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Confirm => 4,
            InputAction::ToggleMusic => 5,
            InputAction::NextTrack => 6,
            InputAction::ZoomIn => 7,
            InputAction::ZoomOut => 8,
            InputAction::Quit => 9,
        }
    }
}
