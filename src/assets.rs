//! Best-effort loading of optional text sprites.
//!
//! Every sprite starts out `Pending` while a loader thread reads it from the
//! asset directory. Renderers poll the store once per frame and fall back to
//! procedural drawing for anything that is not `Ready`.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::components::PieceType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Unavailable,
}

impl<T> AssetState<T> {
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            AssetState::Ready(value) => Some(value),
            AssetState::Pending | AssetState::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, AssetState::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Block(PieceType),
    Player,
    Obstacle,
}

impl AssetId {
    #[must_use]
    pub fn all() -> Vec<AssetId> {
        PieceType::ALL
            .iter()
            .map(|&piece| AssetId::Block(piece))
            .chain([AssetId::Player, AssetId::Obstacle])
            .collect()
    }

    /// Location of the asset relative to the asset directory.
    #[must_use]
    pub fn relative_path(self) -> PathBuf {
        match self {
            AssetId::Block(piece) => PathBuf::from("blocks").join(format!("block_{}.txt", piece.id())),
            AssetId::Player => PathBuf::from("sprites").join("player.txt"),
            AssetId::Obstacle => PathBuf::from("sprites").join("obstacle.txt"),
        }
    }
}

/// A small piece of text art. Lines keep their leading spaces; trailing
/// whitespace and blank lines at the end are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    lines: Vec<String>,
}

impl Sprite {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines: Vec<String> = text.lines().map(|line| line.trim_end().to_string()).collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        if lines.iter().all(String::is_empty) {
            bail!("sprite has no visible characters");
        }
        Ok(Self { lines })
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.as_str().width())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// The start of the first line that fits in `width` terminal columns,
    /// padded with spaces. Used as a board-cell skin.
    #[must_use]
    pub fn glyph(&self, width: usize) -> String {
        let first = self.lines.first().map_or("", String::as_str);
        let mut glyph = String::new();
        let mut used = 0;
        for ch in first.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width {
                break;
            }
            glyph.push(ch);
            used += ch_width;
        }
        glyph.extend(std::iter::repeat_n(' ', width - used));
        glyph
    }
}

type LoadResult = (AssetId, Option<Sprite>);

static UNAVAILABLE: AssetState<Sprite> = AssetState::Unavailable;

pub struct AssetStore {
    states: HashMap<AssetId, AssetState<Sprite>>,
    receiver: Option<Receiver<LoadResult>>,
}

impl AssetStore {
    /// A store where nothing will ever load.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            states: AssetId::all()
                .into_iter()
                .map(|id| (id, AssetState::Unavailable))
                .collect(),
            receiver: None,
        }
    }

    /// Starts reading every sprite from `directory` on a background thread.
    #[must_use]
    pub fn load_in_background(directory: PathBuf) -> Self {
        let (sender, receiver) = unbounded();

        let spawned = thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                for id in AssetId::all() {
                    let sprite = match load_sprite(&directory, id) {
                        Ok(sprite) => Some(sprite),
                        Err(e) => {
                            debug!("Asset {id:?} unavailable: {e:#}");
                            None
                        }
                    };
                    if sender.send((id, sprite)).is_err() {
                        break;
                    }
                }
            });

        match spawned {
            Ok(_) => Self {
                states: AssetId::all()
                    .into_iter()
                    .map(|id| (id, AssetState::Pending))
                    .collect(),
                receiver: Some(receiver),
            },
            Err(e) => {
                warn!("Failed to start asset loader: {e}");
                Self::empty()
            }
        }
    }

    /// Applies finished loads without blocking. Returns how many assets
    /// changed state.
    pub fn poll(&mut self) -> usize {
        let Some(receiver) = &self.receiver else {
            return 0;
        };

        let mut updated = 0;
        let mut finished = false;
        loop {
            match receiver.try_recv() {
                Ok((id, sprite)) => {
                    let state = sprite.map_or(AssetState::Unavailable, AssetState::Ready);
                    self.states.insert(id, state);
                    updated += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.receiver = None;
            for state in self.states.values_mut() {
                if state.is_pending() {
                    *state = AssetState::Unavailable;
                    updated += 1;
                }
            }
            let ready = self.states.values().filter(|s| s.ready().is_some()).count();
            info!("Asset loading finished: {ready} of {} sprites ready", self.states.len());
        }

        updated
    }

    #[must_use]
    pub fn state(&self, id: AssetId) -> &AssetState<Sprite> {
        self.states.get(&id).unwrap_or(&UNAVAILABLE)
    }

    #[must_use]
    pub fn sprite(&self, id: AssetId) -> Option<&Sprite> {
        self.state(id).ready()
    }

    /// True once no asset is still pending.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.states.values().any(AssetState::is_pending)
    }
}

fn load_sprite(directory: &Path, id: AssetId) -> Result<Sprite> {
    let path = directory.join(id.relative_path());
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    Sprite::parse(&text).with_context(|| format!("parsing {}", path.display()))
}
