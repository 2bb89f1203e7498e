use crate::gpu::DEPTH_FORMAT;
use crate::mesh::CubeMesh;
use crate::uniforms::{UniformBlock, UniformWriter};
use glam::{Mat4, Vec3};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// WGSL entry point each stage must define.
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Errors from loading, compiling or linking a shader program.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("failed to read {stage} shader {}: {source}", .path.display())]
    Read {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader {} is empty", .path.display())]
    EmptySource { stage: ShaderStage, path: PathBuf },
    #[error("failed to compile {stage} shader {}: {message}", .path.display())]
    Compile {
        stage: ShaderStage,
        path: PathBuf,
        message: String,
    },
    #[error("failed to link shader program: {message}")]
    Link { message: String },
}

/// WGSL source for one pipeline stage.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    path: PathBuf,
    code: String,
}

impl ShaderSource {
    /// Read an entire WGSL file.
    pub fn load(stage: ShaderStage, path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|source| ProgramError::Read {
            stage,
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_code(stage, path, code)
    }

    /// Wrap in-memory WGSL; `path` is only used in diagnostics.
    pub fn from_code(
        stage: ShaderStage,
        path: impl Into<PathBuf>,
        code: impl Into<String>,
    ) -> Result<Self, ProgramError> {
        let (path, code) = (path.into(), code.into());
        if code.trim().is_empty() {
            return Err(ProgramError::EmptySource { stage, path });
        }
        Ok(Self { stage, path, code })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Attachment formats the program renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramTarget {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl ProgramTarget {
    /// Colour target of the given format plus the renderer's depth buffer.
    pub fn with_depth(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            depth_format: Some(DEPTH_FORMAT),
        }
    }
}

/// A linked vertex + fragment program with a uniform block addressed by name.
///
/// Both stages share one uniform buffer at `@group(0) @binding(0)`. Uniform
/// writes are staged on the CPU and copied to the GPU by [`ShaderProgram::upload`].
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Load, compile and link the program from two WGSL files.
    pub fn from_files(
        device: &wgpu::Device,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        target: ProgramTarget,
    ) -> Result<Self, ProgramError> {
        let vertex = ShaderSource::load(ShaderStage::Vertex, vertex_path)?;
        let fragment = ShaderSource::load(ShaderStage::Fragment, fragment_path)?;
        Self::new(device, &vertex, &fragment, UniformBlock::scene(), target)
    }

    /// Compile each stage independently, then link them into one pipeline.
    pub fn new(
        device: &wgpu::Device,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
        uniforms: UniformBlock,
        target: ProgramTarget,
    ) -> Result<Self, ProgramError> {
        let vertex_module = compile(device, vertex)?;
        let fragment_module = compile(device, fragment)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: uniforms.size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("program_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(ShaderStage::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[CubeMesh::vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(ShaderStage::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: target.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ProgramError::Link {
                message: error.to_string(),
            });
        }

        tracing::info!(
            "linked shader program from {} and {}",
            vertex.path().display(),
            fragment.path().display()
        );

        Ok(Self {
            pipeline,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    /// Bind the program for subsequent draws in `pass`.
    pub fn use_program(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
    }

    /// Copy staged uniforms to the GPU if any changed since the last upload.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if self.uniforms.take_dirty() {
            queue.write_buffer(&self.uniform_buffer, 0, self.uniforms.bytes());
        }
    }
}

impl UniformWriter for ShaderProgram {
    /// Stage a `vec3` uniform. Unknown names are ignored.
    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.uniforms.set_vec3(name, value);
    }

    /// Stage a `mat4x4` uniform. Unknown names are ignored.
    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.uniforms.set_mat4(name, value);
    }
}

fn compile(device: &wgpu::Device, source: &ShaderSource) -> Result<wgpu::ShaderModule, ProgramError> {
    let label = format!("{}_shader", source.stage());
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(source.code().into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ProgramError::Compile {
            stage: source.stage(),
            path: source.path().to_path_buf(),
            message: error.to_string(),
        }),
        None => {
            tracing::debug!("compiled {} shader {}", source.stage(), source.path().display());
            Ok(module)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_whole_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "@vertex\nfn vs_main() {{}}\n").unwrap();
        let source = ShaderSource::load(ShaderStage::Vertex, tmp.path()).unwrap();
        assert_eq!(source.code(), "@vertex\nfn vs_main() {}\n");
        assert_eq!(source.stage(), ShaderStage::Vertex);
        assert_eq!(source.path(), tmp.path());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frag.wgsl");
        let err = ShaderSource::load(ShaderStage::Fragment, &path).unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Read {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        let message = err.to_string();
        assert!(message.contains("fragment"));
        assert!(message.contains("frag.wgsl"));
    }

    #[test]
    fn blank_source_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let err = ShaderSource::load(ShaderStage::Vertex, tmp.path()).unwrap_err();
        assert!(matches!(err, ProgramError::EmptySource { .. }));

        let err = ShaderSource::from_code(ShaderStage::Fragment, "inline", " \n\t").unwrap_err();
        assert!(matches!(err, ProgramError::EmptySource { .. }));
    }

    #[test]
    fn stage_entry_points() {
        assert_eq!(ShaderStage::Vertex.entry_point(), "vs_main");
        assert_eq!(ShaderStage::Fragment.entry_point(), "fs_main");
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
    }

    #[test]
    fn link_error_message() {
        let err = ProgramError::Link {
            message: "entry point mismatch".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to link shader program: entry point mismatch"
        );
    }
}
