use std::{fmt, path::PathBuf, str::FromStr};

use clap::Parser;
use glam::{vec3, Vec3};
use thiserror::Error;

use crate::{controls::Command, particles::morph};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Morphs a cloud of particles between the meshes of a glTF file")]
pub struct Args {
    /// glTF or GLB file whose top-level mesh nodes are the morph targets
    #[arg(default_value = "models.glb")]
    pub model: PathBuf,

    /// Background color
    #[arg(long, default_value = "#160920")]
    pub clear_color: Color,

    /// Particle color of one half of the particles
    #[arg(long, default_value = "#ff7300")]
    pub primary_color: Color,

    /// Particle color of the other half of the particles
    #[arg(long, default_value = "#0091ff")]
    pub secondary_color: Color,

    /// Morph animation duration in seconds
    #[arg(long, default_value_t = morph::DEFAULT_DURATION)]
    pub duration: f32,

    /// Base sprite size, scaled by the viewport height
    #[arg(long, default_value_t = 0.4)]
    pub particle_size: f32,

    /// Fixed seed for particle padding and sizes; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// Panel parameters as commands, applied once at startup.
    pub fn commands(&self) -> Vec<Command> {
        vec![
            Command::SetClearColor(self.clear_color),
            Command::SetPrimaryColor(self.primary_color),
            Command::SetSecondaryColor(self.secondary_color),
            Command::SetDuration(self.duration),
        ]
    }
}

pub const DEFAULT_CLEAR_COLOR: Color = Color::new(0x16, 0x09, 0x20);
pub const DEFAULT_PRIMARY_COLOR: Color = Color::new(0xff, 0x73, 0x00);
pub const DEFAULT_SECONDARY_COLOR: Color = Color::new(0x00, 0x91, 0xff);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color must have 6 hex digits: {0:?}")]
    InvalidLength(String),
    #[error("invalid hex digits in color: {0:?}")]
    InvalidDigits(String),
}

/// An sRGB color written as `#rrggbb`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_srgb(self) -> Vec3 {
        vec3(self.r as f32, self.g as f32, self.b as f32) / 255.
    }

    pub fn to_linear(self) -> Vec3 {
        let srgb = self.to_srgb();
        vec3(
            srgb_to_linear(srgb.x),
            srgb_to_linear(srgb.y),
            srgb_to_linear(srgb.z),
        )
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_owned()))?;
        if digits.len() != 6 {
            return Err(ColorParseError::InvalidLength(s.to_owned()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigits(s.to_owned()));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError::InvalidDigits(s.to_owned()))?;
        Ok(Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
