//! GPU renderer for the falling pieces.
//!
//! Renders straight to the swapchain texture via `pixels.render_with(...)`,
//! so the pixel buffer stays at 1x1 and nothing is uploaded per frame except
//! the instance list. One vertex/index buffer pair is created per catalog
//! shape at startup and shared by every piece of that shape.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use pixels::{wgpu, PixelsContext};
use wgpu::util::DeviceExt;

use engine::surface::SurfaceSize;

use crate::grid::CELL_SIZE;
use crate::piece::Piece;
use crate::shapes::ShapeKind;

const COLOR_BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Globals {
    screen: [f32; 2],
    scale: f32,
    _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Vertex {
    pos: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Instance {
    pos: [f32; 2],
    angle: f32,
    reflect: f32,
    color: [f32; 3],
    _pad: f32,
}

const SHADER: &str = r#"
struct Globals {
  screen: vec2<f32>,
  scale: f32,
  _pad: f32,
};

@group(0) @binding(0) var<uniform> globals: Globals;

struct VsIn {
  @location(0) pos: vec2<f32>,
  @location(1) inst_pos: vec2<f32>,
  @location(2) inst_angle: f32,
  @location(3) inst_reflect: f32,
  @location(4) inst_color: vec3<f32>,
};

struct VsOut {
  @builtin(position) position: vec4<f32>,
  @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(input: VsIn) -> VsOut {
  var p = input.pos;
  if (input.inst_reflect != 0.0) {
    p.x = -p.x;
  }
  let c = cos(input.inst_angle);
  let s = sin(input.inst_angle);
  let rotated = vec2<f32>(c * p.x - s * p.y, s * p.x + c * p.y);
  let world = rotated * globals.scale + input.inst_pos;
  let ndc = world / (globals.screen * 0.5);

  var out: VsOut;
  out.position = vec4<f32>(ndc, 0.0, 1.0);
  out.color = input.inst_color;
  return out;
}

@fragment
fn fs_main(input: VsOut) -> @location(0) vec4<f32> {
  return vec4<f32>(input.color, 1.0);
}
"#;

/// Uploaded geometry for one catalog shape.
struct ShapeBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

pub struct BlockRenderer {
    pipeline: wgpu::RenderPipeline,
    globals_buf: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shapes: Vec<ShapeBuffers>,

    instance_buf: wgpu::Buffer,
    instance_capacity: usize,
    instances: Vec<Instance>,
    batches: Vec<(usize, u32, u32)>,
}

impl BlockRenderer {
    /// Builds the pipeline and uploads the whole shape catalog. Context-bound;
    /// call only on the render thread. Shader or pipeline validation failure
    /// is fatal at startup.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("block_globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("block_globals_buf"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("block_globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("block_shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("block_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("block_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Instance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            1 => Float32x2, // pos
                            2 => Float32,   // angle
                            3 => Float32,   // reflect
                            4 => Float32x3  // color
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let shapes = ShapeKind::ALL
            .iter()
            .map(|kind| {
                let spec = kind.spec();
                let verts: Vec<Vertex> = spec.vertices.iter().map(|&pos| Vertex { pos }).collect();
                let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("block_shape_vertices"),
                    contents: bytemuck::cast_slice(&verts),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("block_shape_indices"),
                    contents: bytemuck::cast_slice(spec.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                ShapeBuffers {
                    vertices,
                    indices,
                    index_count: spec.indices.len() as u32,
                }
            })
            .collect();

        let instance_capacity = 256;
        let instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("block_instances"),
            size: (instance_capacity * std::mem::size_of::<Instance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            globals_buf,
            globals_bind_group,
            shapes,
            instance_buf,
            instance_capacity,
            instances: Vec::new(),
            batches: Vec::new(),
        }
    }

    /// Groups pieces by shape into contiguous instance runs so each shape's
    /// buffers are bound once per frame.
    fn build_instances(&mut self, pieces: &[Arc<Piece>]) {
        self.instances.clear();
        self.batches.clear();

        for shape_index in 0..self.shapes.len() {
            let start = self.instances.len() as u32;
            for piece in pieces {
                if piece.shape().index() != shape_index {
                    continue;
                }
                let (x, y) = piece.position();
                self.instances.push(Instance {
                    pos: [x as f32, y as f32],
                    angle: piece.rotation_steps() as f32 * FRAC_PI_2,
                    reflect: if piece.reflected() { 1.0 } else { 0.0 },
                    color: piece.color(),
                    _pad: 0.0,
                });
            }
            let end = self.instances.len() as u32;
            if end > start {
                self.batches.push((shape_index, start, end));
            }
        }
    }

    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        render_target: &wgpu::TextureView,
        ctx: &PixelsContext,
        size: SurfaceSize,
        pieces: &[Arc<Piece>],
    ) {
        self.build_instances(pieces);
        self.ensure_instance_capacity(&ctx.device, self.instances.len());

        let globals = Globals {
            screen: [size.width.max(1) as f32, size.height.max(1) as f32],
            scale: CELL_SIZE as f32,
            _pad: 0.0,
        };
        ctx.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));

        if !self.instances.is_empty() {
            ctx.queue
                .write_buffer(&self.instance_buf, 0, bytemuck::cast_slice(&self.instances));
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("block_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: render_target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(COLOR_BACKGROUND),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_vertex_buffer(1, self.instance_buf.slice(..));

        for &(shape_index, start, end) in &self.batches {
            let shape = &self.shapes[shape_index];
            pass.set_vertex_buffer(0, shape.vertices.slice(..));
            pass.set_index_buffer(shape.indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..shape.index_count, 0, start..end);
        }
    }

    fn ensure_instance_capacity(&mut self, device: &wgpu::Device, needed: usize) {
        if needed <= self.instance_capacity {
            return;
        }

        let mut cap = self.instance_capacity.max(1);
        while cap < needed {
            cap = cap.saturating_mul(2);
        }

        self.instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("block_instances"),
            size: (cap * std::mem::size_of::<Instance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.instance_capacity = cap;
    }
}
