pub mod html;
pub mod id_generator;
pub mod qr;
