/// View layer: the selection overlay canvas and the control rows
/// around it
pub mod canvas;
pub mod controls;
