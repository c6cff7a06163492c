#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chip folder and the dealer that answers custom-screen requests.

use netbattle_core::{Chip, Command, Event};
use netbattle_system_chip_behavior::ChipLibrary;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Maximum number of chips a folder holds.
pub const FOLDER_CAPACITY: usize = 30;

/// Chips every new folder starts with.
pub const STARTER_CHIPS: [&str; 3] = ["Cannon", "Cannon", "Cannon"];

/// Reasons a chip cannot be added to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolderError {
    /// The folder already holds its maximum number of chips.
    #[error("folder is full ({capacity} chips)")]
    Full {
        /// Folder capacity.
        capacity: usize,
    },
    /// No chip with the given name exists in the library.
    #[error("unknown chip `{name}`")]
    UnknownChip {
        /// Requested name.
        name: String,
    },
}

/// Player deck of chips with their behaviour already resolved.
#[derive(Clone, Debug)]
pub struct ChipFolder {
    chips: Vec<Chip>,
    capacity: usize,
}

impl ChipFolder {
    /// Creates an empty folder with the standard capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(FOLDER_CAPACITY)
    }

    /// Creates an empty folder holding at most `capacity` chips.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chips: Vec::new(),
            capacity,
        }
    }

    /// Creates the folder a new player starts with.
    pub fn starter(library: &ChipLibrary) -> Result<Self, FolderError> {
        let mut folder = Self::new();
        for name in STARTER_CHIPS {
            folder.add(library, name)?;
        }
        Ok(folder)
    }

    /// Adds a copy of the named library chip.
    pub fn add(&mut self, library: &ChipLibrary, name: &str) -> Result<(), FolderError> {
        if self.chips.len() >= self.capacity {
            return Err(FolderError::Full {
                capacity: self.capacity,
            });
        }
        let chip = library.get(name).ok_or_else(|| FolderError::UnknownChip {
            name: name.to_owned(),
        })?;
        self.chips.push(chip.clone());
        Ok(())
    }

    /// Removes the chip at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<Chip> {
        (index < self.chips.len()).then(|| self.chips.remove(index))
    }

    /// Draws up to `count` distinct chips at random without removing them.
    pub fn draw(&self, count: usize, rng: &mut impl Rng) -> Vec<Chip> {
        self.chips.choose_multiple(rng, count).cloned().collect()
    }

    /// Names of the chips in folder order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.chips.iter().map(|chip| chip.name().to_owned()).collect()
    }

    /// Number of chips in the folder.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Reports whether the folder is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Reports whether another chip fits.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.chips.len() < self.capacity
    }
}

impl Default for ChipFolder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure system dealing custom-screen hands from a folder.
#[derive(Debug)]
pub struct Dealer {
    folder: ChipFolder,
    rng: ChaCha8Rng,
}

impl Dealer {
    /// Creates a dealer drawing from `folder` with a seeded generator.
    #[must_use]
    pub fn new(folder: ChipFolder, rng_seed: u64) -> Self {
        Self {
            folder,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Folder the dealer draws from.
    #[must_use]
    pub fn folder(&self) -> &ChipFolder {
        &self.folder
    }

    /// Answers custom-screen requests with a freshly drawn hand.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::CustomRequested { hand_size } = event {
                let hand = self.folder.draw(*hand_size, &mut self.rng);
                tracing::debug!(drawn = hand.len(), "custom hand drawn");
                out.push(Command::OpenCustom { hand });
            }
        }
    }
}
