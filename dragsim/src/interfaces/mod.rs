pub mod gui_interface;
pub mod renderer;
