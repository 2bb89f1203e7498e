use glam::{Mat4, Vec3};

/// Type of a uniform field, with its WGSL uniform-address-space layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Vec3,
    Mat4,
}

impl UniformKind {
    fn align(self) -> u64 {
        16
    }

    fn size(self) -> u64 {
        match self {
            UniformKind::Vec3 => 12,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    pub offset: u64,
}

/// Anything that accepts uniform writes by name.
pub trait UniformWriter {
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_mat4(&mut self, name: &str, value: Mat4);
}

fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// CPU-side copy of a uniform buffer whose fields are addressed by name.
///
/// Fields are laid out in declaration order the way WGSL lays out a struct
/// in the uniform address space, so the block matches a shader-side struct
/// declaring the same members in the same order.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    fields: Vec<UniformField>,
    data: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn builder() -> UniformBlockBuilder {
        UniformBlockBuilder::default()
    }

    /// Transforms and lighting inputs for the lit cube.
    ///
    /// Matches `struct Uniforms` in `resources/shader/*.wgsl`.
    pub fn scene() -> Self {
        let mut block = Self::builder()
            .field("model", UniformKind::Mat4)
            .field("view", UniformKind::Mat4)
            .field("projection", UniformKind::Mat4)
            .field("light_pos", UniformKind::Vec3)
            .field("view_pos", UniformKind::Vec3)
            .build();
        block.set_mat4("model", Mat4::IDENTITY);
        block.set_mat4("view", Mat4::IDENTITY);
        block.set_mat4("projection", Mat4::IDENTITY);
        block
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Write a `vec3<f32>` field. Returns `false` if no such field exists.
    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> bool {
        self.write(name, UniformKind::Vec3, bytemuck::bytes_of(&value.to_array()))
    }

    /// Write a `mat4x4<f32>` field (column major). Returns `false` if no such field exists.
    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> bool {
        self.write(name, UniformKind::Mat4, bytemuck::bytes_of(&value.to_cols_array()))
    }

    /// Read back a `vec3<f32>` field.
    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        let bytes = self.read(name, UniformKind::Vec3)?;
        let value: [f32; 3] = bytemuck::pod_read_unaligned(bytes);
        Some(Vec3::from_array(value))
    }

    /// Read back a `mat4x4<f32>` field.
    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        let bytes = self.read(name, UniformKind::Mat4)?;
        let value: [f32; 16] = bytemuck::pod_read_unaligned(bytes);
        Some(Mat4::from_cols_array(&value))
    }

    /// Whether the block changed since the last call, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn read(&self, name: &str, kind: UniformKind) -> Option<&[u8]> {
        let field = self.field(name).filter(|field| field.kind == kind)?;
        let start = field.offset as usize;
        Some(&self.data[start..start + kind.size() as usize])
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) -> bool {
        let Some(field) = self.field(name) else {
            tracing::debug!("uniform `{name}` not found, ignoring write");
            return false;
        };
        if field.kind != kind {
            tracing::debug!(
                "uniform `{name}` is {:?}, ignoring {:?} write",
                field.kind,
                kind
            );
            return false;
        }
        let start = field.offset as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self.dirty = true;
        true
    }
}

impl UniformWriter for UniformBlock {
    fn set_vec3(&mut self, name: &str, value: Vec3) {
        UniformBlock::set_vec3(self, name, value);
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        UniformBlock::set_mat4(self, name, value);
    }
}

#[derive(Debug, Default)]
pub struct UniformBlockBuilder {
    fields: Vec<UniformField>,
    cursor: u64,
}

impl UniformBlockBuilder {
    pub fn field(mut self, name: &'static str, kind: UniformKind) -> Self {
        let offset = align_to(self.cursor, kind.align());
        self.fields.push(UniformField { name, kind, offset });
        self.cursor = offset + kind.size();
        self
    }

    pub fn build(self) -> UniformBlock {
        let align = self
            .fields
            .iter()
            .map(|field| field.kind.align())
            .max()
            .unwrap_or(16);
        let size = align_to(self.cursor, align).max(16);
        UniformBlock {
            fields: self.fields,
            data: vec![0; size as usize],
            dirty: true,
        }
    }
}
