pub mod exposure;
pub mod histogram;
pub mod outlier_filter;
pub mod point_sampler;
pub mod quantile_sampler;
pub mod quantizer;
pub mod sample_buffer;
pub mod spatial_sampler;
