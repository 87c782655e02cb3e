use glam::Vec2;

/// The drawing operations a frame needs from its raster target
pub trait Surface {
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32, rgba: [f32; 4]);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, rgba: [f32; 4]);
}

#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct CircleInstance {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct LineInstance {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub color: [f32; 4],
}

/// Records a frame as GPU instances, circles first and lines on top
#[derive(Default)]
pub struct DrawList {
    pub circles: Vec<CircleInstance>,
    pub lines: Vec<LineInstance>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for DrawList {
    fn clear(&mut self) {
        self.circles.clear();
        self.lines.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, rgba: [f32; 4]) {
        self.circles.push(CircleInstance {
            center,
            radius,
            color: rgba,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, rgba: [f32; 4]) {
        self.lines.push(LineInstance {
            from,
            to,
            width,
            color: rgba,
        });
    }
}
