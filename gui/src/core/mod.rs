pub mod egui_surface;
pub mod gui;
pub mod png_export;
