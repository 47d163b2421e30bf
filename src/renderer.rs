pub mod cpu_renderer;

pub use cpu_renderer::CpuRenderer;
