use std::{borrow::Cow, marker::PhantomData};

use log::debug;
use wgpu::{util::DeviceExt, BindGroupLayoutEntry};

use crate::{
    color::Rgb,
    surface::{CircleInstance, DrawList, LineInstance},
};

// Two triangles per quad. Circles span [-1, 1]^2, lines run 0..1 along the
// segment and -1..1 across it.
const CIRCLE_CORNERS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];
const LINE_CORNERS: [[f32; 2]; 6] = [
    [0.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [0.0, -1.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

const MIN_INSTANCES: usize = 128;

/// Instance buffer that grows to fit the largest frame seen so far
struct InstanceBuffer<T> {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
    _instance: PhantomData<T>,
}

impl<T: bytemuck::Pod> InstanceBuffer<T> {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            label,
            buffer: create_instance_buffer::<T>(device, label, MIN_INSTANCES),
            capacity: MIN_INSTANCES,
            len: 0,
            _instance: PhantomData,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[T]) {
        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            self.buffer = create_instance_buffer::<T>(device, self.label, self.capacity);
            debug!("Grew {} to {} instances", self.label, self.capacity);
        }

        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
        self.len = instances.len() as u32;
    }
}

fn create_instance_buffer<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<T>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct RenderModule {
    screen_size_buffer: wgpu::Buffer,
    circle_corners: wgpu::Buffer,
    line_corners: wgpu::Buffer,
    circles: InstanceBuffer<CircleInstance>,
    lines: InstanceBuffer<LineInstance>,

    clear_color: wgpu::Color,
    bind_group: wgpu::BindGroup,
    circle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
}

impl RenderModule {
    pub fn new(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        background: Rgb,
    ) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("render.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("render.wgsl"))),
        });

        let screen_size_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Screen Size Buffer"),
            size: 2 * 4,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let circle_corners = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Circle Corners"),
            contents: bytemuck::cast_slice(&CIRCLE_CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let line_corners = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Corners"),
            contents: bytemuck::cast_slice(&LINE_CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[BindGroupLayoutEntry {
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
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_size_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("render"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let corner_layout = wgpu::VertexBufferLayout {
            array_stride: 2 * 4,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![3 => Float32x2],
        };
        let circle_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader_module,
            swapchain_format,
            ("circle_vertex", "circle_fragment"),
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CircleInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32x4],
                },
                corner_layout,
            ],
        );
        let line_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader_module,
            swapchain_format,
            ("line_vertex", "line_fragment"),
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32, 3 => Float32x4],
                },
                wgpu::VertexBufferLayout {
                    array_stride: 2 * 4,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![4 => Float32x2],
                },
            ],
        );

        Self {
            screen_size_buffer,
            circle_corners,
            line_corners,
            circles: InstanceBuffer::new(device, "Circle Instances"),
            lines: InstanceBuffer::new(device, "Line Instances"),

            clear_color: background.to_wgpu(),
            bind_group,
            circle_pipeline,
            line_pipeline,
        }
    }

    /// Uploads the frame's draw instructions
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, draw_list: &DrawList) {
        self.circles.upload(device, queue, &draw_list.circles);
        self.lines.upload(device, queue, &draw_list.lines);
    }

    /// Clears the target and draws the prepared circles, then the lines
    pub fn begin_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: None,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_bind_group(0, &self.bind_group, &[]);

        if self.circles.len > 0 {
            rpass.set_pipeline(&self.circle_pipeline);
            rpass.set_vertex_buffer(0, self.circles.buffer.slice(..));
            rpass.set_vertex_buffer(1, self.circle_corners.slice(..));
            rpass.draw(0..CIRCLE_CORNERS.len() as u32, 0..self.circles.len);
        }

        if self.lines.len > 0 {
            rpass.set_pipeline(&self.line_pipeline);
            rpass.set_vertex_buffer(0, self.lines.buffer.slice(..));
            rpass.set_vertex_buffer(1, self.line_corners.slice(..));
            rpass.draw(0..LINE_CORNERS.len() as u32, 0..self.lines.len);
        }

        rpass
    }

    pub fn update_size(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.screen_size_buffer,
            0,
            bytemuck::bytes_of(&[width as f32, height as f32]),
        );
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    (vertex_entry, fragment_entry): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout],
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(vertex_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: vertex_entry,
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
