//! Semantic role labels (PropBank style).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VsaError;

/// The closed set of role labels a step can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleLabel {
    #[serde(rename = "ARG0")]
    Arg0,
    #[serde(rename = "ARG1")]
    Arg1,
    #[serde(rename = "ARG2")]
    Arg2,
    #[serde(rename = "ARG3")]
    Arg3,
    #[serde(rename = "ARG4")]
    Arg4,
    #[serde(rename = "ARGM-TMP")]
    ArgmTmp,
    #[serde(rename = "ARGM-DIR")]
    ArgmDir,
    #[serde(rename = "ARGM-DIS")]
    ArgmDis,
    #[serde(rename = "ARGM-EXT")]
    ArgmExt,
    #[serde(rename = "ARGM-LOC")]
    ArgmLoc,
    #[serde(rename = "ARGM-MNR")]
    ArgmMnr,
    #[serde(rename = "ARGM-MOD")]
    ArgmMod,
    #[serde(rename = "ARGM-NEG")]
    ArgmNeg,
    #[serde(rename = "ARGM-PRD")]
    ArgmPrd,
    #[serde(rename = "ARGM-PRP")]
    ArgmPrp,
    #[serde(rename = "ARGM-ADV")]
    ArgmAdv,
    #[serde(rename = "ARGM-GOL")]
    ArgmGol,
    #[serde(rename = "ARGM-CAU")]
    ArgmCau,
    #[serde(rename = "ARGM-REC")]
    ArgmRec,
    #[serde(rename = "ARGM-COM")]
    ArgmCom,
    #[serde(rename = "R-ARGM-TMP")]
    RArgmTmp,
    #[serde(rename = "R-ARGM-LOC")]
    RArgmLoc,
    #[serde(rename = "R-ARG0")]
    RArg0,
    #[serde(rename = "R-ARG1")]
    RArg1,
    #[serde(rename = "R-ARG2")]
    RArg2,
    #[serde(rename = "C-ARG1")]
    CArg1,
    #[serde(rename = "C-ARG2")]
    CArg2,
    #[serde(rename = "V")]
    V,
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "NAMED-GROUP")]
    NamedGroup,
}

impl RoleLabel {
    pub const ALL: [RoleLabel; 30] = [
        RoleLabel::Arg0,
        RoleLabel::Arg1,
        RoleLabel::Arg2,
        RoleLabel::Arg3,
        RoleLabel::Arg4,
        RoleLabel::ArgmTmp,
        RoleLabel::ArgmDir,
        RoleLabel::ArgmDis,
        RoleLabel::ArgmExt,
        RoleLabel::ArgmLoc,
        RoleLabel::ArgmMnr,
        RoleLabel::ArgmMod,
        RoleLabel::ArgmNeg,
        RoleLabel::ArgmPrd,
        RoleLabel::ArgmPrp,
        RoleLabel::ArgmAdv,
        RoleLabel::ArgmGol,
        RoleLabel::ArgmCau,
        RoleLabel::ArgmRec,
        RoleLabel::ArgmCom,
        RoleLabel::RArgmTmp,
        RoleLabel::RArgmLoc,
        RoleLabel::RArg0,
        RoleLabel::RArg1,
        RoleLabel::RArg2,
        RoleLabel::CArg1,
        RoleLabel::CArg2,
        RoleLabel::V,
        RoleLabel::None,
        RoleLabel::NamedGroup,
    ];

    /// Number of role labels; also the most roles one step can hold.
    pub const COUNT: usize = Self::ALL.len();

    /// Canonical label text, e.g. `"ARGM-LOC"`.
    pub fn as_str(self) -> &'static str {
        match self {
            RoleLabel::Arg0 => "ARG0",
            RoleLabel::Arg1 => "ARG1",
            RoleLabel::Arg2 => "ARG2",
            RoleLabel::Arg3 => "ARG3",
            RoleLabel::Arg4 => "ARG4",
            RoleLabel::ArgmTmp => "ARGM-TMP",
            RoleLabel::ArgmDir => "ARGM-DIR",
            RoleLabel::ArgmDis => "ARGM-DIS",
            RoleLabel::ArgmExt => "ARGM-EXT",
            RoleLabel::ArgmLoc => "ARGM-LOC",
            RoleLabel::ArgmMnr => "ARGM-MNR",
            RoleLabel::ArgmMod => "ARGM-MOD",
            RoleLabel::ArgmNeg => "ARGM-NEG",
            RoleLabel::ArgmPrd => "ARGM-PRD",
            RoleLabel::ArgmPrp => "ARGM-PRP",
            RoleLabel::ArgmAdv => "ARGM-ADV",
            RoleLabel::ArgmGol => "ARGM-GOL",
            RoleLabel::ArgmCau => "ARGM-CAU",
            RoleLabel::ArgmRec => "ARGM-REC",
            RoleLabel::ArgmCom => "ARGM-COM",
            RoleLabel::RArgmTmp => "R-ARGM-TMP",
            RoleLabel::RArgmLoc => "R-ARGM-LOC",
            RoleLabel::RArg0 => "R-ARG0",
            RoleLabel::RArg1 => "R-ARG1",
            RoleLabel::RArg2 => "R-ARG2",
            RoleLabel::CArg1 => "C-ARG1",
            RoleLabel::CArg2 => "C-ARG2",
            RoleLabel::V => "V",
            RoleLabel::None => "NONE",
            RoleLabel::NamedGroup => "NAMED-GROUP",
        }
    }
}

impl fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleLabel {
    type Err = VsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleLabel::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| VsaError::UnknownRoleLabel(s.to_string()))
    }
}
