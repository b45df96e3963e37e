use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Character identity (`ftKind`)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
#[repr(u32)]
pub enum FighterKind {
    Mario = 0,
    Fox = 1,
    Captain = 2,
    Donkey = 3,
    Kirby = 4,
    Koopa = 5,
    Link = 6,
    Seak = 7,
    Ness = 8,
    Peach = 9,
    Popo = 10,
    Nana = 11,
    Pikachu = 12,
    Samus = 13,
    Yoshi = 14,
    Purin = 15,
    Mewtwo = 16,
    Luigi = 17,
    Mars = 18,
    Zelda = 19,
    CLink = 20,
    DrMario = 21,
    Falco = 22,
    Pichu = 23,
    GameWatch = 24,
    Ganon = 25,
    Emblem = 26,
    MasterHand = 27,
    CrazyHand = 28,
    Boy = 29,
    Girl = 30,
    GKoopa = 31,
    Sandbag = 32,
    /// Also the number of real kinds
    None = 33,
}

impl FighterKind {
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::from_repr(value)
    }

    /// Internal name as used by the game's symbols
    pub fn internal_name(&self) -> &'static str {
        self.into()
    }

    /// Name shown to players
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mario => "Mario",
            Self::Fox => "Fox",
            Self::Captain => "Captain Falcon",
            Self::Donkey => "Donkey Kong",
            Self::Kirby => "Kirby",
            Self::Koopa => "Bowser",
            Self::Link => "Link",
            Self::Seak => "Sheik",
            Self::Ness => "Ness",
            Self::Peach => "Peach",
            Self::Popo => "Popo",
            Self::Nana => "Nana",
            Self::Pikachu => "Pikachu",
            Self::Samus => "Samus",
            Self::Yoshi => "Yoshi",
            Self::Purin => "Jigglypuff",
            Self::Mewtwo => "Mewtwo",
            Self::Luigi => "Luigi",
            Self::Mars => "Marth",
            Self::Zelda => "Zelda",
            Self::CLink => "Young Link",
            Self::DrMario => "Dr. Mario",
            Self::Falco => "Falco",
            Self::Pichu => "Pichu",
            Self::GameWatch => "Mr. Game & Watch",
            Self::Ganon => "Ganondorf",
            Self::Emblem => "Roy",
            Self::MasterHand => "Master Hand",
            Self::CrazyHand => "Crazy Hand",
            Self::Boy => "Wireframe (male)",
            Self::Girl => "Wireframe (female)",
            Self::GKoopa => "Giga Bowser",
            Self::Sandbag => "Sandbag",
            Self::None => "None",
        }
    }
}

/// Skeleton part index into a fighter's bone table
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
    Display,
)]
#[repr(u32)]
pub enum FighterPart {
    TopN = 0,
    TransN,
    XRotN,
    YRotN,
    HipN,
    WaistN,
    LLegJA,
    LLegJ,
    LKneeJ,
    LFootJA,
    LFootJ,
    RLegJA,
    RLegJ,
    RKneeJ,
    RFootJA,
    RFootJ,
    BustN,
    LShoulderN,
    LShoulderJA,
    LShoulderJ,
    LArmJ,
    LHandN,
    L1stNa,
    L1stNb,
    L2ndNa,
    L2ndNb,
    L3rdNa,
    L3rdNb,
    L4thNa,
    L4thNb,
    LThumbNa,
    LThumbNb,
    LHandNb,
    NeckN,
    HeadN,
    RShoulderN,
    RShoulderJA,
    RShoulderJ,
    RArmJ,
    RHandN,
    R1stNa,
    R1stNb,
    R2ndNa,
    R2ndNb,
    R3rdNa,
    R3rdNb,
    R4thNa,
    R4thNb,
    RThumbNa,
    RThumbNb,
    RHandNb,
    ThrowN,
    TransN2,
    /// Sentinel the game uses past the common parts
    #[strum(serialize = "FtPart_109")]
    Part109 = 109,
}

impl FighterPart {
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().and_then(Self::from_repr)
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}
