//! Lookup of channels by name.

use std::fmt;
use std::str::FromStr;

use crate::channel::Channel;
use crate::error::ChannelError;
use crate::gates::OneQubitGates;

/// Every channel that can be built from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelName {
    Hadamard,
    Identity,
    LandauStreater,
    WernerHolevo,
    QutritSuperposition,
    OneQubitGates,
}

impl ChannelName {
    pub const ALL: [ChannelName; 6] = [
        ChannelName::Hadamard,
        ChannelName::Identity,
        ChannelName::LandauStreater,
        ChannelName::WernerHolevo,
        ChannelName::QutritSuperposition,
        ChannelName::OneQubitGates,
    ];

    /// The kebab-case name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelName::Hadamard => "hadamard",
            ChannelName::Identity => "identity",
            ChannelName::LandauStreater => "landau-streater",
            ChannelName::WernerHolevo => "werner-holevo",
            ChannelName::QutritSuperposition => "qutrit-superposition",
            ChannelName::OneQubitGates => "one-qubit-gates",
        }
    }

    /// The channel with its default parameters.
    pub fn channel(self) -> Channel {
        match self {
            ChannelName::Hadamard => Channel::Hadamard,
            ChannelName::Identity => Channel::identity(),
            ChannelName::LandauStreater => Channel::LandauStreater,
            ChannelName::WernerHolevo => Channel::WernerHolevo,
            ChannelName::QutritSuperposition => Channel::QutritSuperposition,
            ChannelName::OneQubitGates => Channel::OneQubitGates(OneQubitGates::new()),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChannelName::Hadamard => "Hadamard gate on one qubit",
            ChannelName::Identity => "Qutrit identity on an encoded qubit pair",
            ChannelName::LandauStreater => "Landau-Streater qutrit channel, two environment qubits",
            ChannelName::WernerHolevo => "Werner-Holevo qutrit channel, two environment qubits",
            ChannelName::QutritSuperposition => "Prepares (|00>+|01>+|10>)/sqrt(3)",
            ChannelName::OneQubitGates => "Independent u3 rotations, identity by default",
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelName {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == wanted)
            .ok_or_else(|| ChannelError::UnknownChannel(s.to_string()))
    }
}

impl From<ChannelName> for Channel {
    fn from(name: ChannelName) -> Self {
        name.channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in ChannelName::ALL {
            assert_eq!(name.to_string().parse::<ChannelName>().unwrap(), name);
        }
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_underscores() {
        assert_eq!(
            "Landau_Streater".parse::<ChannelName>().unwrap(),
            ChannelName::LandauStreater
        );
        assert!(matches!(
            "depolarizing".parse::<ChannelName>(),
            Err(ChannelError::UnknownChannel(name)) if name == "depolarizing"
        ));
    }

    #[test]
    fn test_registry_name_matches_channel_name() {
        for name in ChannelName::ALL {
            assert_eq!(name.channel().name(), name.as_str());
        }
    }

    #[test]
    fn test_theory_availability() {
        assert!(ChannelName::WernerHolevo.channel().theory().is_some());
        assert!(ChannelName::QutritSuperposition.channel().theory().is_none());
    }
}
