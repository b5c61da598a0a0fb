//! Farcaster Mini App manifest served at `/.well-known/farcaster.json`.

use serde::Serialize;

use crate::config::ManifestSection;

/// Wallet and action capabilities the Mini App needs from its host
pub const REQUIRED_CAPABILITIES: [&str; 4] = [
    "actions.openUrl",
    "actions.signIn",
    "wallet.sendTransaction",
    "wallet.getEthereumProvider",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniAppManifest {
    pub account_association: AccountAssociation,
    pub frame: FrameInfo,
    pub required_capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    pub version: String,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub home_url: String,
}

impl From<&ManifestSection> for MiniAppManifest {
    fn from(section: &ManifestSection) -> Self {
        let association = &section.account_association;
        Self {
            account_association: AccountAssociation {
                header: association.header.clone(),
                payload: association.payload.clone(),
                signature: association.signature.clone(),
            },
            frame: FrameInfo {
                version: "1".to_string(),
                name: section.name.clone(),
                description: section.description.clone(),
                icon_url: section.icon_url.clone(),
                home_url: section.home_url.clone(),
            },
            required_capabilities: REQUIRED_CAPABILITIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}
