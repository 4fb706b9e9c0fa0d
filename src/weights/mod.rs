pub mod mapper;
pub mod tensor;

pub use mapper::{check_shape, map_weights_to_edges, map_weights_with, Normalizer};
pub use tensor::WeightTensor;
