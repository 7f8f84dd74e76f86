//! Static classification of metadata types
//!
//! Which types accept the `*` wildcard member in a manifest, and which types
//! keep their members inside folders (and the folder type used to list those
//! folders).

use crate::error::{PackageError, PackageResult};

/// Wildcard member meaning "all members of this type"
pub const WILDCARD: &str = "*";

/// Types that accept `*` as a member
const WILDCARD_TYPES: &[&str] = &[
    "AccountRelationshipShareRule",
    "ActionLinkGroupTemplate",
    "ApexClass",
    "ApexComponent",
    "ApexPage",
    "ApexTrigger",
    "AppMenu",
    "ApprovalProcess",
    "ArticleType",
    "AssignmentRules",
    "Audience",
    "AuthProvider",
    "AuraDefinitionBundle",
    "AutoResponseRules",
    "Bot",
    "BrandingSet",
    "CallCenter",
    "Certificate",
    "CleanDataService",
    "CMSConnectSource",
    "Community",
    "CommunityTemplateDefinition",
    "CommunityThemeDefinition",
    "CompactLayout",
    "ConnectedApp",
    "ContentAsset",
    "CorsWhitelistOrigin",
    "CustomApplication",
    "CustomApplicationComponent",
    "CustomFeedFilter",
    "CustomHelpMenuSection",
    "CustomMetadata",
    "CustomLabels",
    "CustomObjectTranslation",
    "CustomPageWebLink",
    "CustomPermission",
    "CustomSite",
    "CustomTab",
    "DataCategoryGroup",
    "DelegateGroup",
    "DuplicateRule",
    "EclairGeoData",
    "EntitlementProcess",
    "EntitlementTemplate",
    "EventDelivery",
    "EventSubscription",
    "ExternalServiceRegistration",
    "ExternalDataSource",
    "FeatureParameterBoolean",
    "FeatureParameterDate",
    "FeatureParameterInteger",
    "FieldSet",
    "FlexiPage",
    "Flow",
    "FlowCategory",
    "FlowDefinition",
    "GlobalValueSet",
    "GlobalValueSetTranslation",
    "Group",
    "HomePageComponent",
    "HomePageLayout",
    "InstalledPackage",
    "KeywordList",
    "Layout",
    "LightningBolt",
    "LightningComponentBundle",
    "LightningExperienceTheme",
    "LiveChatAgentConfig",
    "LiveChatButton",
    "LiveChatDeployment",
    "LiveChatSensitiveDataRule",
    "ManagedTopics",
    "MatchingRules",
    "MilestoneType",
    "MlDomain",
    "ModerationRule",
    "NamedCredential",
    "Network",
    "NetworkBranding",
    "PathAssistant",
    "PermissionSet",
    "PlatformCachePartition",
    "Portal",
    "PostTemplate",
    "PresenceDeclineReason",
    "PresenceUserConfig",
    "Profile",
    "ProfilePasswordPolicy",
    "ProfileSessionSetting",
    "Queue",
    "QueueRoutingConfig",
    "QuickAction",
    "RecommendationStrategy",
    "RecordActionDeployment",
    "ReportType",
    "Role",
    "SamlSsoConfig",
    "Scontrol",
    "ServiceChannel",
    "ServicePresenceStatus",
    "SharingRules",
    "SharingSet",
    "SiteDotCom",
    "Skill",
    "StandardValueSetTranslation",
    "StaticResource",
    "SynonymDictionary",
    "Territory",
    "Territory2",
    "Territory2Model",
    "Territory2Rule",
    "Territory2Type",
    "TopicsForObjects",
    "TransactionSecurityPolicy",
    "Translations",
    "WaveApplication",
    "WaveDashboard",
    "WaveDataflow",
    "WaveDataset",
    "WaveLens",
    "WaveTemplateBundle",
    "WaveXmd",
    "Workflow",
];

/// Folder-based types and the type used to list their folders
const FOLDER_TYPES: &[(&str, &str)] = &[
    ("Dashboard", "DashboardFolder"),
    ("Document", "DocumentFolder"),
    ("EmailTemplate", "EmailFolder"),
    ("Report", "ReportFolder"),
];

/// Classification of a single metadata type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataType<'a> {
    pub name: &'a str,
    pub accepts_wildcard: bool,
    pub folder_type: Option<&'static str>,
}

impl<'a> MetadataType<'a> {
    /// Look up the static classification for a type name
    pub fn classify(name: &'a str) -> Self {
        Self {
            name,
            accepts_wildcard: accepts_wildcard(name),
            folder_type: folder_type(name).ok(),
        }
    }
}

/// Whether `*` may stand in for every member of this type
pub fn accepts_wildcard(name: &str) -> bool {
    WILDCARD_TYPES.contains(&name)
}

/// Whether members of this type live inside folders
pub fn is_folder_based(name: &str) -> bool {
    FOLDER_TYPES.iter().any(|(ty, _)| *ty == name)
}

/// The folder type used to enumerate folders of a folder-based type
pub fn folder_type(name: &str) -> PackageResult<&'static str> {
    FOLDER_TYPES
        .iter()
        .find(|(ty, _)| *ty == name)
        .map(|(_, folder)| *folder)
        .ok_or_else(|| PackageError::UnknownFolderType(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_types() {
        assert!(accepts_wildcard("ApexClass"));
        assert!(accepts_wildcard("Workflow"));
        assert!(!accepts_wildcard("CustomObject"));
        assert!(!accepts_wildcard("Report"));
        assert!(!accepts_wildcard("apexclass"));
    }

    #[test]
    fn test_folder_types() {
        assert!(is_folder_based("Report"));
        assert!(is_folder_based("EmailTemplate"));
        assert!(!is_folder_based("ApexClass"));

        assert_eq!(folder_type("Dashboard"), Ok("DashboardFolder"));
        assert_eq!(folder_type("EmailTemplate"), Ok("EmailFolder"));
    }

    #[test]
    fn test_unknown_folder_type_fails_loudly() {
        assert_eq!(
            folder_type("ApexClass"),
            Err(PackageError::UnknownFolderType("ApexClass".to_string()))
        );
    }

    #[test]
    fn test_classify() {
        let report = MetadataType::classify("Report");
        assert!(!report.accepts_wildcard);
        assert_eq!(report.folder_type, Some("ReportFolder"));

        let class = MetadataType::classify("ApexClass");
        assert_eq!(class.folder_type, None);
        assert!(class.accepts_wildcard);
    }

    #[test]
    fn test_no_type_is_both_wildcard_and_folder_based() {
        for (ty, _) in FOLDER_TYPES {
            assert!(!accepts_wildcard(ty), "{} should not accept *", ty);
        }
    }
}
