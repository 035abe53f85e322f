pub mod constants;
pub mod frame;
pub mod gray_image;
pub mod model_resolver;
pub mod region;
