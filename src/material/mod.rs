pub mod blinn_phong;
