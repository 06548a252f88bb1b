//=========================================================================
// Input Messages
//=========================================================================
//
// Platform-independent input payloads delivered to scenes one message
// at a time. The windowing layer that produces them lives outside this
// crate; these types are the narrow seam it feeds.
//
//=========================================================================

//=== MouseButton Enum ====================================================
// Represents a physical mouse button.
// Used to identify which button triggered a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

//=== KeyCode Enum ========================================================
// Represents a physical keyboard key in a simplified,
// cross-platform form.
//
// Only the most common alphanumeric, directional, and editing keys
// are included for now — additional codes can be added as the input
// layer grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow keys -------------------------------------------------------
    ArrowDown, ArrowLeft, ArrowRight, ArrowUp,

    //--- Editing / control keys -------------------------------------------
    Enter, Escape, Space, Tab, Backspace,

    //--- Fallback ---------------------------------------------------------
    // Used for keys not mapped explicitly by the input layer.
    Unidentified,
}

//=== InputMessage Enum ===================================================

/// A single input message as handed to `Scene::handle_input`.
///
/// Messages are dispatched one at a time, top of the scene stack first;
/// a scene returning `true` consumes the message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMessage {
    /// A key went down.
    KeyDown(KeyCode),

    /// A key was released.
    KeyUp(KeyCode),

    /// A mouse button went down.
    MouseDown(MouseButton),

    /// A mouse button was released.
    MouseUp(MouseButton),

    /// The pointer moved, in surface coordinates.
    MouseMove { x: f32, y: f32 },

    /// Translated character input.
    Char(char),
}
