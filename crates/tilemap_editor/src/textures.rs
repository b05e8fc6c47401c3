//! Texture lifecycle: add, replace and delete palette textures
//!
//! Replacing a texture with one of different size and deleting a texture are
//! destructive for the map, so both go through a pending step that the caller
//! confirms or cancels. Confirmed changes cascade into the canvas layers.

use std::path::{Path, PathBuf};

use bevy::log::{info, warn};

use crate::canvas::Canvas;
use crate::palette::{Palette, TextureInfo};

/// Number of texture ids available
pub const TEXTURE_CAPACITY: usize = 100;

/// Error types for texture operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// All texture ids are in use
    PoolExhausted,
    /// No texture is registered under this id
    UnknownTexture(i32),
    /// The image could not be read
    Decode(String),
    /// The image has no pixels
    ZeroSized,
    /// Another destructive change is waiting for confirmation
    ConfirmationPending,
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::PoolExhausted => {
                write!(f, "No texture slot available ({} in use)", TEXTURE_CAPACITY)
            }
            TextureError::UnknownTexture(id) => write!(f, "Unknown texture id {}", id),
            TextureError::Decode(e) => write!(f, "Failed to read image: {}", e),
            TextureError::ZeroSized => write!(f, "Image has zero width or height"),
            TextureError::ConfirmationPending => {
                write!(f, "Another texture change is awaiting confirmation")
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// Lowest-free allocator over `0..capacity`
#[derive(Debug, Clone)]
pub struct IdPool {
    used: Vec<bool>,
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new(TEXTURE_CAPACITY)
    }
}

impl IdPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            used: vec![false; capacity],
        }
    }

    /// Take the lowest free id
    pub fn allocate(&mut self) -> Option<i32> {
        let index = self.used.iter().position(|used| !used)?;
        self.used[index] = true;
        Some(index as i32)
    }

    /// Return an id to the pool. False if it was not allocated.
    pub fn release(&mut self, id: i32) -> bool {
        match usize::try_from(id).ok().and_then(|i| self.used.get_mut(i)) {
            Some(slot) if *slot => {
                *slot = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_allocated(&self, id: i32) -> bool {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.used.get(i).copied())
            .unwrap_or(false)
    }

    pub fn in_use(&self) -> usize {
        self.used.iter().filter(|used| **used).count()
    }
}

/// Supplies pixel dimensions for texture files
pub trait TextureProvider {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), TextureError>;
}

/// Reads dimensions from image file headers
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileProvider;

impl TextureProvider for ImageFileProvider {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), TextureError> {
        image::image_dimensions(path).map_err(|e| TextureError::Decode(e.to_string()))
    }
}

/// A destructive change waiting for the user's decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingTextureChange {
    Replace {
        id: i32,
        source_path: PathBuf,
        pixel_width: u32,
        pixel_height: u32,
    },
    Delete {
        id: i32,
    },
}

/// Result of asking to replace a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Same size; swapped without touching the map
    Replaced,
    /// Different size; call `confirm` to apply
    NeedsConfirmation,
}

/// What a confirmed change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedTextureChange {
    Replaced { id: i32, cleared_tiles: usize },
    Deleted { id: i32, cleared_tiles: usize },
}

#[derive(Debug, Clone, Default)]
pub struct TextureManager {
    pool: IdPool,
    pending: Option<PendingTextureChange>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PendingTextureChange> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Load a texture file into the palette and make it the active tab
    pub fn add_texture(
        &mut self,
        palette: &mut Palette,
        provider: &dyn TextureProvider,
        path: impl AsRef<Path>,
    ) -> Result<i32, TextureError> {
        let path = path.as_ref();
        let (pixel_width, pixel_height) = read_dimensions(provider, path)?;

        let Some(id) = self.pool.allocate() else {
            warn!("No texture slot available for {:?}", path);
            return Err(TextureError::PoolExhausted);
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let info = TextureInfo {
            name: format!("{}. {}", palette.textures().len(), file_name),
            source_path: path.to_path_buf(),
            pixel_width,
            pixel_height,
        };
        info!(
            "Added texture {} '{}' ({}x{})",
            id, info.name, pixel_width, pixel_height
        );
        palette.insert_texture(id, info);
        Ok(id)
    }

    /// Swap a texture's image.
    ///
    /// Equal dimensions swap immediately. Otherwise the change is held until
    /// `confirm`, since tiles beyond the new bounds will be erased.
    pub fn request_replace(
        &mut self,
        palette: &mut Palette,
        provider: &dyn TextureProvider,
        id: i32,
        path: impl AsRef<Path>,
    ) -> Result<ReplaceOutcome, TextureError> {
        if self.pending.is_some() {
            return Err(TextureError::ConfirmationPending);
        }
        let current = palette
            .texture(id)
            .ok_or(TextureError::UnknownTexture(id))?;
        let path = path.as_ref();
        let (pixel_width, pixel_height) = read_dimensions(provider, path)?;

        if (pixel_width, pixel_height) == (current.pixel_width, current.pixel_height) {
            palette.replace_texture(id, path.to_path_buf(), pixel_width, pixel_height);
            info!("Replaced texture {} with {:?}", id, path);
            return Ok(ReplaceOutcome::Replaced);
        }

        self.pending = Some(PendingTextureChange::Replace {
            id,
            source_path: path.to_path_buf(),
            pixel_width,
            pixel_height,
        });
        Ok(ReplaceOutcome::NeedsConfirmation)
    }

    /// Ask to delete a texture; applied by `confirm`
    pub fn request_delete(&mut self, palette: &Palette, id: i32) -> Result<(), TextureError> {
        if self.pending.is_some() {
            return Err(TextureError::ConfirmationPending);
        }
        if palette.texture(id).is_none() {
            return Err(TextureError::UnknownTexture(id));
        }
        self.pending = Some(PendingTextureChange::Delete { id });
        Ok(())
    }

    /// Apply the pending change, cascading into the canvas
    pub fn confirm(
        &mut self,
        palette: &mut Palette,
        canvas: &mut Canvas,
    ) -> Option<AppliedTextureChange> {
        let change = self.pending.take()?;
        // A preview may hold tiles the cascade is about to invalidate
        canvas.brush.abort();

        match change {
            PendingTextureChange::Replace {
                id,
                source_path,
                pixel_width,
                pixel_height,
            } => {
                palette.texture(id)?;
                palette.replace_texture(id, source_path, pixel_width, pixel_height);
                let (tiles_w, tiles_h) = palette.texture_tiles(id)?;
                let cleared_tiles = canvas.clear_out_of_bounds_tiles(id, tiles_w - 1, tiles_h - 1);
                if palette.selected_texture() == Some(id)
                    && !palette.selection().fits(tiles_w, tiles_h)
                {
                    palette.clear_selection();
                }
                info!(
                    "Replaced texture {} ({}x{}), cleared {} tiles",
                    id, pixel_width, pixel_height, cleared_tiles
                );
                Some(AppliedTextureChange::Replaced { id, cleared_tiles })
            }
            PendingTextureChange::Delete { id } => {
                let cleared_tiles = canvas.clear_tiles_referencing_texture(id);
                palette.remove_texture(id)?;
                self.pool.release(id);
                palette.clear_selection();
                info!("Deleted texture {}, cleared {} tiles", id, cleared_tiles);
                Some(AppliedTextureChange::Deleted { id, cleared_tiles })
            }
        }
    }

    /// Drop the pending change without applying it
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Forget every texture id
    pub fn reset(&mut self) {
        self.pool = IdPool::default();
        self.pending = None;
    }
}

fn read_dimensions(provider: &dyn TextureProvider, path: &Path) -> Result<(u32, u32), TextureError> {
    let (w, h) = provider.dimensions(path)?;
    if w == 0 || h == 0 {
        return Err(TextureError::ZeroSized);
    }
    Ok((w, h))
}
