use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::ContractEnum;

/// Declares a closed string enumeration whose wire names are used verbatim
/// in requests, prompts and agent replies.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl ContractEnum for $name {
            const NAMES: &'static [&'static str] = &[$($wire),+];

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// How the user's working hours are organised.
    WorkTimeType {
        Fixed => "FIXED",
        Shift => "SHIFT",
        Free => "FREE",
    }
}

wire_enum! {
    LifestyleType {
        Morning => "MORNING",
        Night => "NIGHT",
        Irregular => "IRREGULAR",
    }
}

wire_enum! {
    MissionType {
        Exercise => "EXERCISE",
        Diet => "DIET",
    }
}

wire_enum! {
    Difficulty {
        Easy => "EASY",
        Normal => "NORMAL",
        Hard => "HARD",
    }
}

wire_enum! {
    /// Outcome of a mission the user attempted.
    MissionResult {
        Success => "SUCCESS",
        Failure => "FAILURE",
    }
}

wire_enum! {
    /// Tone of an encouragement message shown on the home screen.
    Intent {
        Praise => "PRAISE",
        Retry => "RETRY",
        Normal => "NORMAL",
        Push => "PUSH",
    }
}

wire_enum! {
    ChatInputType {
        Text => "TEXT",
        Option => "OPTION",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_serde() {
        assert_eq!(
            serde_json::to_value(LifestyleType::Night).unwrap(),
            serde_json::json!("NIGHT")
        );
        let parsed: Intent = serde_json::from_value(serde_json::json!("PUSH")).unwrap();
        assert_eq!(parsed, Intent::Push);
    }

    #[test]
    fn contract_names_match_variants() {
        assert_eq!(Difficulty::NAMES, &["EASY", "NORMAL", "HARD"]);
        assert_eq!(MissionType::from_name("DIET"), Some(MissionType::Diet));
        assert_eq!(MissionType::from_name("Diet"), None);
        assert_eq!(ChatInputType::Option.to_string(), "OPTION");
    }

    #[test]
    fn unknown_request_value_is_rejected_by_serde() {
        let parsed = serde_json::from_value::<WorkTimeType>(serde_json::json!("PART_TIME"));
        assert!(parsed.is_err());
    }
}
