mod conjugate_factor_tests;
mod factor_graph_builder_tests;
mod known_data_tests;
mod sampler_tests;
mod utils;
