//! Sampled 2D texture with CPU generated mipmaps

use std::path::Path;

use image::imageops::FilterType;
use image::{ImageBuffer, Rgba, Rgba32FImage, RgbaImage};

use crate::core::error::Error;
use crate::core::types::Result;

/// Number of mip levels for a full chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    width.max(height).max(1).ilog2() + 1
}

/// Size of mip `level`, never smaller than 1x1
pub fn mip_size(width: u32, height: u32, level: u32) -> (u32, u32) {
    ((width >> level).max(1), (height >> level).max(1))
}

/// Texture coordinate wrapping
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    /// Border color as linear RGBA
    ClampToBorder([f32; 4]),
}

impl WrapMode {
    fn address_mode(self) -> wgpu::AddressMode {
        match self {
            Self::Repeat => wgpu::AddressMode::Repeat,
            Self::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            Self::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            Self::ClampToBorder(_) => wgpu::AddressMode::ClampToBorder,
        }
    }

    /// Closest border color wgpu can express
    fn border_color(self) -> Option<wgpu::SamplerBorderColor> {
        match self {
            Self::ClampToBorder([r, g, b, a]) => Some(if a < 0.5 {
                wgpu::SamplerBorderColor::TransparentBlack
            } else if (r + g + b) / 3.0 >= 0.5 {
                wgpu::SamplerBorderColor::OpaqueWhite
            } else {
                wgpu::SamplerBorderColor::OpaqueBlack
            }),
            _ => None,
        }
    }

    /// Fall back to clamp-to-edge when border sampling is unavailable
    fn supported(self, border_supported: bool) -> Self {
        match self {
            Self::ClampToBorder(_) if !border_supported => Self::ClampToEdge,
            other => other,
        }
    }
}

/// A sampler has a single border color; the U axis wins when both set one
fn shared_border_color(wrap_u: WrapMode, wrap_v: WrapMode) -> Option<wgpu::SamplerBorderColor> {
    wrap_u.border_color().or(wrap_v.border_color())
}

/// Minification/magnification filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filtering {
    Nearest,
    Linear,
}

impl Filtering {
    fn filter_mode(self) -> wgpu::FilterMode {
        match self {
            Self::Nearest => wgpu::FilterMode::Nearest,
            Self::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Mip chain of an RGBA8 image, level 0 excluded
pub fn mip_chain_rgba8(data: &[u8], width: u32, height: u32) -> Result<Vec<RgbaImage>> {
    check_len(data.len(), width, height, 4)?;
    let base = RgbaImage::from_raw(width, height, data.to_vec())
        .ok_or_else(|| Error::Texture(format!("expected {} bytes of RGBA8 data", width * height * 4)))?;
    Ok(downsample_chain(&base))
}

/// Mip chain of an RGBA32F image, level 0 excluded
pub fn mip_chain_f32(data: &[f32], width: u32, height: u32) -> Result<Vec<Rgba32FImage>> {
    check_len(data.len(), width, height, 4)?;
    let base = Rgba32FImage::from_raw(width, height, data.to_vec())
        .ok_or_else(|| Error::Texture(format!("expected {} floats of RGBA data", width * height * 4)))?;
    Ok(downsample_chain(&base))
}

fn downsample_chain<S>(base: &ImageBuffer<Rgba<S>, Vec<S>>) -> Vec<ImageBuffer<Rgba<S>, Vec<S>>>
where
    Rgba<S>: image::Pixel<Subpixel = S> + 'static,
    S: image::Primitive + 'static,
{
    let (width, height) = base.dimensions();
    let levels = mip_level_count(width, height);
    let mut chain: Vec<ImageBuffer<Rgba<S>, Vec<S>>> = Vec::with_capacity(levels as usize - 1);

    for level in 1..levels {
        let (w, h) = mip_size(width, height, level);
        let previous = chain.last().unwrap_or(base);
        let next = image::imageops::resize(previous, w, h, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

/// 2D texture plus the view and sampler used to read it
pub struct Texture2D {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    mipmaps: bool,
    wrap_u: WrapMode,
    wrap_v: WrapMode,
    min_filter: Filtering,
    mag_filter: Filtering,
}

impl Texture2D {
    /// Allocate a texture whose contents are uploaded later
    pub fn empty(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        mipmaps: bool,
    ) -> Self {
        let (texture, view) = create_texture(device, width, height, format, mipmaps);
        let wrap = WrapMode::Repeat;
        let (min_filter, mag_filter) = (Filtering::Linear, Filtering::Linear);
        let sampler = create_sampler(device, (wrap, wrap), min_filter, mag_filter, mipmaps);

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            format,
            mipmaps,
            wrap_u: wrap,
            wrap_v: wrap,
            min_filter,
            mag_filter,
        }
    }

    /// Create a color texture from tightly packed RGBA8 pixels
    ///
    /// Texels are sampled as stored; the scene passes render in display space.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        mipmaps: bool,
    ) -> Result<Self> {
        let mut texture = Self::empty(device, width, height, wgpu::TextureFormat::Rgba8Unorm, mipmaps);
        texture.upload_rgba8(device, queue, data, width, height)?;
        Ok(texture)
    }

    /// Decode an image file into a color texture
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path, mipmaps: bool) -> Result<Self> {
        let image = image::open(path)
            .inspect_err(|e| log::warn!("Failed to load texture {}: {e}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        log::info!("Loaded texture {} ({width}x{height})", path.display());
        Self::from_rgba8(device, queue, image.as_raw(), width, height, mipmaps)
    }

    /// Replace the contents with RGBA8 pixels, resizing if needed
    pub fn upload_rgba8(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        if !matches!(
            self.format,
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
        ) {
            return Err(Error::Texture(format!("cannot upload RGBA8 data to a {:?} texture", self.format)));
        }
        check_len(data.len(), width, height, 4)?;
        let chain = if self.mipmaps { mip_chain_rgba8(data, width, height)? } else { Vec::new() };

        self.resize_storage(device, width, height);
        self.write_level(queue, 0, data, width, height, 4);
        for (level, mip) in chain.iter().enumerate() {
            let (w, h) = mip.dimensions();
            self.write_level(queue, level as u32 + 1, mip.as_raw(), w, h, 4);
        }
        Ok(())
    }

    /// Replace the contents with RGBA32F texels, resizing if needed
    pub fn upload_f32(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[f32],
        width: u32,
        height: u32,
    ) -> Result<()> {
        if self.format != wgpu::TextureFormat::Rgba32Float {
            return Err(Error::Texture(format!("cannot upload float data to a {:?} texture", self.format)));
        }
        check_len(data.len(), width, height, 4)?;
        let chain = if self.mipmaps { mip_chain_f32(data, width, height)? } else { Vec::new() };

        self.resize_storage(device, width, height);
        self.write_level(queue, 0, bytemuck::cast_slice(data), width, height, 16);
        for (level, mip) in chain.iter().enumerate() {
            let (w, h) = mip.dimensions();
            self.write_level(queue, level as u32 + 1, bytemuck::cast_slice(mip.as_raw()), w, h, 16);
        }
        Ok(())
    }

    /// Set the same wrapping on both axes
    pub fn set_wrap(&mut self, device: &wgpu::Device, wrap: WrapMode) {
        self.set_wrap_uv(device, wrap, wrap);
    }

    /// Set wrapping separately for the U (s) and V (t) axes
    pub fn set_wrap_uv(&mut self, device: &wgpu::Device, wrap_u: WrapMode, wrap_v: WrapMode) {
        let border_supported = device
            .features()
            .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        if !border_supported
            && [wrap_u, wrap_v]
                .iter()
                .any(|w| matches!(w, WrapMode::ClampToBorder(_)))
        {
            log::warn!("Clamp-to-border sampling unsupported, clamping to edge");
        }
        self.wrap_u = wrap_u.supported(border_supported);
        self.wrap_v = wrap_v.supported(border_supported);
        self.rebuild_sampler(device);
    }

    pub fn set_filtering(&mut self, device: &wgpu::Device, min: Filtering, mag: Filtering) {
        self.min_filter = min;
        self.mag_filter = mag;
        self.rebuild_sampler(device);
    }

    pub fn set_linear_filtering(&mut self, device: &wgpu::Device) {
        self.set_filtering(device, Filtering::Linear, Filtering::Linear);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Wrapping on the (U, V) axes
    pub fn wrap(&self) -> (WrapMode, WrapMode) {
        (self.wrap_u, self.wrap_v)
    }

    pub fn mip_levels(&self) -> u32 {
        self.texture.mip_level_count()
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    fn resize_storage(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            let (texture, view) = create_texture(device, width, height, self.format, self.mipmaps);
            self.texture = texture;
            self.view = view;
            self.width = width;
            self.height = height;
        }
    }

    fn write_level(&self, queue: &wgpu::Queue, level: u32, bytes: &[u8], width: u32, height: u32, pixel_size: u32) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixel_size * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn rebuild_sampler(&mut self, device: &wgpu::Device) {
        self.sampler = create_sampler(
            device,
            (self.wrap_u, self.wrap_v),
            self.min_filter,
            self.mag_filter,
            self.mipmaps,
        );
    }
}

fn check_len(len: usize, width: u32, height: u32, channels: usize) -> Result<()> {
    let expected = width as usize * height as usize * channels;
    if len != expected {
        return Err(Error::Texture(format!("expected {expected} components, got {len}")));
    }
    Ok(())
}

fn create_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    mipmaps: bool,
) -> (wgpu::Texture, wgpu::TextureView) {
    let mip_level_count = if mipmaps { mip_level_count(width, height) } else { 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("texture_2d"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn create_sampler(
    device: &wgpu::Device,
    (wrap_u, wrap_v): (WrapMode, WrapMode),
    min_filter: Filtering,
    mag_filter: Filtering,
    mipmaps: bool,
) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("texture_2d_sampler"),
        address_mode_u: wrap_u.address_mode(),
        address_mode_v: wrap_v.address_mode(),
        address_mode_w: wrap_u.address_mode(),
        mag_filter: mag_filter.filter_mode(),
        min_filter: min_filter.filter_mode(),
        mipmap_filter: if mipmaps {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        },
        border_color: shared_border_color(wrap_u, wrap_v),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_mip_size_never_zero() {
        assert_eq!(mip_size(256, 16, 2), (64, 4));
        assert_eq!(mip_size(256, 16, 6), (4, 1));
        assert_eq!(mip_size(256, 16, 8), (1, 1));
    }

    #[test]
    fn test_rgba8_chain_of_uniform_image() {
        let data = [200u8, 100, 50, 255].repeat(8 * 4);
        let chain = mip_chain_rgba8(&data, 8, 4).unwrap();
        let sizes: Vec<_> = chain.iter().map(|m| m.dimensions()).collect();
        assert_eq!(sizes, vec![(4, 2), (2, 1), (1, 1)]);
        assert_eq!(chain[2].get_pixel(0, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_f32_chain() {
        let data = [0.25f32, 0.5, 1.0, 1.0].repeat(4 * 4);
        let chain = mip_chain_f32(&data, 4, 4).unwrap();
        assert_eq!(chain.len(), 2);
        let texel = chain[1].get_pixel(0, 0).0;
        assert!((texel[0] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_chain_rejects_wrong_length() {
        assert!(matches!(mip_chain_rgba8(&[0u8; 7], 2, 1), Err(Error::Texture(_))));
        assert!(check_len(16, 2, 2, 4).is_ok());
        assert!(check_len(15, 2, 2, 4).is_err());
    }

    #[test]
    fn test_border_color_mapping() {
        assert_eq!(
            WrapMode::ClampToBorder([1.0, 1.0, 1.0, 1.0]).border_color(),
            Some(wgpu::SamplerBorderColor::OpaqueWhite)
        );
        assert_eq!(
            WrapMode::ClampToBorder([0.0, 0.0, 0.0, 0.0]).border_color(),
            Some(wgpu::SamplerBorderColor::TransparentBlack)
        );
        assert_eq!(WrapMode::Repeat.border_color(), None);
    }

    #[test]
    fn test_per_axis_border_color() {
        let border = WrapMode::ClampToBorder([0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            shared_border_color(WrapMode::Repeat, border),
            Some(wgpu::SamplerBorderColor::OpaqueBlack)
        );
        assert_eq!(
            shared_border_color(WrapMode::ClampToBorder([1.0; 4]), border),
            Some(wgpu::SamplerBorderColor::OpaqueWhite)
        );
        assert_eq!(shared_border_color(WrapMode::Repeat, WrapMode::ClampToEdge), None);
        assert_eq!(WrapMode::Repeat.address_mode(), wgpu::AddressMode::Repeat);
        assert_eq!(
            WrapMode::MirroredRepeat.address_mode(),
            wgpu::AddressMode::MirrorRepeat
        );
    }

    #[test]
    fn test_border_fallback_without_feature() {
        let border = WrapMode::ClampToBorder([1.0; 4]);
        assert_eq!(border.supported(false), WrapMode::ClampToEdge);
        assert_eq!(border.supported(true), border);
        assert_eq!(WrapMode::Repeat.supported(false), WrapMode::Repeat);
    }
}
