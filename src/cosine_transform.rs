pub mod arai;
pub mod inverse;
pub mod simple;

/// Forward 2D DCT over one 8x8 block in natural (row-major) order.
pub trait Discrete8x8CosineTransformer {
    fn transform(values: &[f32; 64]) -> [f32; 64];
}
