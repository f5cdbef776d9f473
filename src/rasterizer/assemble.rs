//! Primitive assembly: grouping the vertex stream into triangles

use super::error::PipelineError;
use super::types::Topology;

/// One draw: a flat interleaved vertex array plus how to read it
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub topology: Topology,
    /// `stride` floats per vertex, back to back
    pub vertices: &'a [f32],
    pub stride: usize,
    /// Three indices per triangle; only read for `Topology::Indexed`
    pub indices: Option<&'a [u32]>,
}

impl<'a> DrawCall<'a> {
    pub fn triangles(vertices: &'a [f32], stride: usize) -> Self {
        Self { topology: Topology::Triangles, vertices, stride, indices: None }
    }

    pub fn indexed(vertices: &'a [f32], stride: usize, indices: &'a [u32]) -> Self {
        Self { topology: Topology::Indexed, vertices, stride, indices: Some(indices) }
    }

    pub fn fan(vertices: &'a [f32], stride: usize) -> Self {
        Self { topology: Topology::Fan, vertices, stride, indices: None }
    }

    pub fn strip(vertices: &'a [f32], stride: usize) -> Self {
        Self { topology: Topology::Strip, vertices, stride, indices: None }
    }

    pub fn vertex_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.vertices.len() / self.stride
        }
    }

    /// Raw input floats for vertex `i`
    pub fn vertex(&self, i: usize) -> &'a [f32] {
        &self.vertices[i * self.stride..(i + 1) * self.stride]
    }

    /// Check everything assembly relies on, so a bad draw call is refused
    /// before any shader runs
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.stride == 0 {
            return Err(PipelineError::InvalidStride);
        }
        if self.vertices.len() % self.stride != 0 {
            return Err(PipelineError::PartialVertex {
                len: self.vertices.len(),
                stride: self.stride,
            });
        }
        if self.topology == Topology::Indexed {
            let indices = self.indices.ok_or(PipelineError::MissingIndices)?;
            let vertex_count = self.vertex_count();
            let whole = indices.len() - indices.len() % 3;
            if let Some((position, &index)) = indices[..whole]
                .iter()
                .enumerate()
                .find(|(_, &i)| i as usize >= vertex_count)
            {
                return Err(PipelineError::InvalidIndex { index, position, vertex_count });
            }
        }
        Ok(())
    }

    /// Vertices or indices left over after the last whole primitive
    pub fn trailing(&self) -> usize {
        let n = self.vertex_count();
        match self.topology {
            Topology::Triangles => n % 3,
            Topology::Indexed => self.indices.map_or(0, |i| i.len() % 3),
            Topology::Fan | Topology::Strip => 0,
        }
    }

    pub fn primitives(&self) -> Primitives<'a> {
        Primitives {
            topology: self.topology,
            vertex_count: self.vertex_count(),
            indices: self.indices.unwrap_or(&[]),
            next: 0,
        }
    }
}

/// Iterator over the vertex-index triples of a draw call
#[derive(Debug, Clone)]
pub struct Primitives<'a> {
    topology: Topology,
    vertex_count: usize,
    indices: &'a [u32],
    next: usize,
}

impl Primitives<'_> {
    /// Total triangles this draw call produces
    pub fn total(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.vertex_count / 3,
            Topology::Indexed => self.indices.len() / 3,
            Topology::Fan | Topology::Strip => self.vertex_count.saturating_sub(2),
        }
    }
}

impl Iterator for Primitives<'_> {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<[usize; 3]> {
        if self.next >= self.total() {
            return None;
        }
        let i = self.next;
        self.next += 1;

        Some(match self.topology {
            Topology::Triangles => [3 * i, 3 * i + 1, 3 * i + 2],
            Topology::Indexed => [
                self.indices[3 * i] as usize,
                self.indices[3 * i + 1] as usize,
                self.indices[3 * i + 2] as usize,
            ],
            Topology::Fan => [0, i + 1, i + 2],
            // odd triangles swap their first two to keep the winding
            Topology::Strip if i % 2 == 1 => [i + 1, i, i + 2],
            Topology::Strip => [i, i + 1, i + 2],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Primitives<'_> {}
