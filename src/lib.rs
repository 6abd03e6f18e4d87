pub mod level;
pub mod lighting;
pub mod material;
pub use material::blinn_phong;
pub mod player;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod session;
pub mod settings;
pub mod stamina;
pub mod ui;
