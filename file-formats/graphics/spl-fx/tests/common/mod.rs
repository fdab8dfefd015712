//! Byte-level builders for synthetic SPA archives

#![allow(dead_code)]

pub const FLAG_SCALE_ANIM: u32 = 1 << 8;
pub const FLAG_TEX_ANIM: u32 = 1 << 11;
pub const FLAG_SELF_MAINTAINING: u32 = 1 << 14;
pub const FLAG_CHILD: u32 = 1 << 16;
pub const FLAG_GRAVITY: u32 = 1 << 24;
pub const FLAG_RANDOM: u32 = 1 << 25;
pub const FLAG_COLLISION_PLANE: u32 = 1 << 28;

fn fx32(value: f32) -> i32 {
    (value * 4096.0).round() as i32
}

fn fx16(value: f32) -> i16 {
    (value * 4096.0).round() as i16
}

/// Raw fields of one resource record
#[derive(Debug, Clone)]
pub struct RawResource {
    pub flags: u32,
    pub base_pos: [f32; 3],
    pub emission_count: f32,
    pub radius: f32,
    pub length: f32,
    pub axis: [f32; 3],
    pub color: u16,
    pub init_vel_pos: f32,
    pub init_vel_axis: f32,
    pub base_scale: f32,
    pub aspect_ratio: f32,
    /// Frames
    pub start_delay: u16,
    /// Frames
    pub emitter_life_time: u16,
    /// Frames
    pub particle_life_time: u16,
    pub attenuation: u32,
    /// Frames
    pub emission_interval: u8,
    pub base_alpha: u8,
    /// `(value + 384) / 512` per frame, 128 is no resistance
    pub air_resistance: u8,
    pub texture_index: u8,
    /// Encoded optional blocks, in on-disk order
    pub blocks: Vec<u8>,
}

impl Default for RawResource {
    fn default() -> Self {
        Self {
            flags: FLAG_SELF_MAINTAINING,
            base_pos: [0.0; 3],
            emission_count: 1.0,
            radius: 0.0,
            length: 0.0,
            axis: [0.0, 1.0, 0.0],
            color: 0x7FFF,
            init_vel_pos: 0.0,
            init_vel_axis: 0.0,
            base_scale: 1.0,
            aspect_ratio: 1.0,
            start_delay: 0,
            emitter_life_time: 30,
            particle_life_time: 30,
            attenuation: 0,
            emission_interval: 1,
            base_alpha: 31,
            air_resistance: 128,
            texture_index: 0,
            blocks: Vec::new(),
        }
    }
}

impl RawResource {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(88 + self.blocks.len());
        out.extend_from_slice(&self.flags.to_le_bytes());
        for v in self.base_pos {
            out.extend_from_slice(&fx32(v).to_le_bytes());
        }
        out.extend_from_slice(&fx32(self.emission_count).to_le_bytes());
        out.extend_from_slice(&fx32(self.radius).to_le_bytes());
        out.extend_from_slice(&fx32(self.length).to_le_bytes());
        for v in self.axis {
            out.extend_from_slice(&fx16(v).to_le_bytes());
        }
        out.extend_from_slice(&self.color.to_le_bytes());
        out.extend_from_slice(&fx32(self.init_vel_pos).to_le_bytes());
        out.extend_from_slice(&fx32(self.init_vel_axis).to_le_bytes());
        out.extend_from_slice(&fx32(self.base_scale).to_le_bytes());
        out.extend_from_slice(&fx16(self.aspect_ratio).to_le_bytes());
        out.extend_from_slice(&self.start_delay.to_le_bytes());
        out.extend_from_slice(&0i16.to_le_bytes()); // min rotation
        out.extend_from_slice(&0i16.to_le_bytes()); // max rotation
        out.extend_from_slice(&0u16.to_le_bytes()); // init angle
        out.extend_from_slice(&0u16.to_le_bytes()); // reserved
        out.extend_from_slice(&self.emitter_life_time.to_le_bytes());
        out.extend_from_slice(&self.particle_life_time.to_le_bytes());
        out.extend_from_slice(&self.attenuation.to_le_bytes());
        let misc0 = u32::from(self.emission_interval)
            | (u32::from(self.base_alpha) << 8)
            | (u32::from(self.air_resistance) << 16)
            | (u32::from(self.texture_index) << 24);
        out.extend_from_slice(&misc0.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // misc1
        out.extend_from_slice(&0u32.to_le_bytes()); // misc2
        out.extend_from_slice(&0i16.to_le_bytes()); // polygon x
        out.extend_from_slice(&0i16.to_le_bytes()); // polygon y
        out.extend_from_slice(&0u32.to_le_bytes()); // user data
        assert_eq!(out.len(), 88);
        out.extend_from_slice(&self.blocks);
        out
    }
}

/// Scale animation block: start, mid, end, in, out, loop
pub fn scale_anim_block(start: f32, mid: f32, end: f32, curve_in: u8, curve_out: u8) -> Vec<u8> {
    let mut out = Vec::new();
    for v in [start, mid, end] {
        out.extend_from_slice(&fx16(v).to_le_bytes());
    }
    out.extend_from_slice(&[curve_in, curve_out]);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
    out
}

/// Texture animation block over `textures`
pub fn tex_anim_block(textures: &[u8], step: u8, looped: bool) -> Vec<u8> {
    let mut slots = [0u8; 8];
    slots[..textures.len()].copy_from_slice(textures);
    let param = textures.len() as u32 | (u32::from(step) << 8) | (u32::from(looped) << 17);
    let mut out = slots.to_vec();
    out.extend_from_slice(&param.to_le_bytes());
    out
}

/// Child resource block
pub fn child_block(count: u8, interval_frames: u8, life_frames: u16, texture: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&0i16.to_le_bytes()); // random init velocity
    out.extend_from_slice(&fx16(1.0).to_le_bytes()); // end scale
    out.extend_from_slice(&life_frames.to_le_bytes());
    out.extend_from_slice(&[255, 255]); // velocity ratio, scale ratio
    out.extend_from_slice(&0x7FFFu16.to_le_bytes());
    let misc = u32::from(count) | (u32::from(interval_frames) << 16) | (u32::from(texture) << 24);
    out.extend_from_slice(&misc.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

/// Gravity block
pub fn gravity_block(g: [f32; 3]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in g {
        out.extend_from_slice(&fx16(v).to_le_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Random behavior block
pub fn random_block(magnitude: [f32; 3], interval_frames: u16) -> Vec<u8> {
    let mut out = Vec::new();
    for v in magnitude {
        out.extend_from_slice(&fx16(v).to_le_bytes());
    }
    out.extend_from_slice(&interval_frames.to_le_bytes());
    out
}

/// Collision plane block
pub fn collision_plane_block(y: f32, elasticity: f32, bounce: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&fx32(y).to_le_bytes());
    out.extend_from_slice(&fx16(elasticity).to_le_bytes());
    out.extend_from_slice(&u16::from(bounce).to_le_bytes());
    out
}

/// One texture record: descriptor, texels, then palette
pub fn texture_record(param: u32, texels: &[u8], palette: &[u8]) -> Vec<u8> {
    let palette_offset = 32 + texels.len();
    let size = palette_offset + palette.len();
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(b" TPS");
    out.extend_from_slice(&param.to_le_bytes());
    out.extend_from_slice(&(texels.len() as u32).to_le_bytes());
    out.extend_from_slice(&(palette_offset as u32).to_le_bytes());
    out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(texels);
    out.extend_from_slice(palette);
    out
}

/// An 8x8 direct color texture, every texel opaque white
pub fn white_texture() -> Vec<u8> {
    let texels: Vec<u8> = [0xFF, 0xFF].repeat(64);
    texture_record(7, &texels, &[])
}

/// Assemble a complete archive
pub fn archive(resources: &[RawResource], textures: &[Vec<u8>]) -> Vec<u8> {
    let resource_block: Vec<u8> = resources.iter().flat_map(RawResource::to_bytes).collect();
    let texture_block: Vec<u8> = textures.concat();
    let texture_offset = 32 + resource_block.len();

    let mut out = Vec::new();
    out.extend_from_slice(b" APS");
    out.extend_from_slice(b"12_1");
    out.extend_from_slice(&(resources.len() as u16).to_le_bytes());
    out.extend_from_slice(&(textures.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(resource_block.len() as u32).to_le_bytes());
    out.extend_from_slice(&(texture_block.len() as u32).to_le_bytes());
    out.extend_from_slice(&(texture_offset as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&resource_block);
    out.extend_from_slice(&texture_block);
    out
}

/// A one-resource archive with one white texture
pub fn single(resource: RawResource) -> Vec<u8> {
    archive(&[resource], &[white_texture()])
}
