use crate::color;
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgb;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemName(String);

crate::impl_string_newtype!(ItemName);

/// Handle to a raster asset. Resolution to pixels is up to the asset loader.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ImageRef(String);

crate::impl_string_newtype!(ImageRef);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct GroupKey(String);

crate::impl_string_newtype!(GroupKey);

/// One candidate on the wheel.
///
/// Every field is optional on the wire: an item without a usable name still owns a slice, it
/// just contributes no name block to the layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, alias = "display_name")]
    pub name: Option<ItemName>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, alias = "accent")]
    pub color: Option<String>,
    #[serde(default)]
    pub group: Option<GroupKey>,
}

impl Item {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(ItemName::new(name)),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(ImageRef::new(image));
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(GroupKey::new(group));
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .filter(|n| !n.is_blank())
            .map(|n| n.as_str().trim())
    }

    pub fn subtitle_text(&self) -> Option<&str> {
        self.subtitle
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn image_ref(&self) -> Option<&ImageRef> {
        self.image.as_ref().filter(|r| !r.is_blank())
    }

    pub fn accent(&self) -> Srgb<f64> {
        color::accent_or_default(self.color.as_deref())
    }

    /// The configured accent, if it is present but unusable.
    pub fn malformed_accent(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| color::is_malformed(c))
    }

    /// Label used in history and logs, falling back to the subtitle for nameless items.
    pub fn label(&self) -> &str {
        self.display_name()
            .or_else(|| self.subtitle_text())
            .unwrap_or("(unnamed)")
    }
}

/// Selects the active subset of the master list by group. An empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupFilter {
    #[serde(default)]
    pub groups: Vec<GroupKey>,
}

impl GroupFilter {
    pub fn new(groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            groups: groups.into_iter().map(GroupKey::new).collect(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.groups.is_empty()
            || item.group.as_ref().is_some_and(|g| {
                self.groups
                    .iter()
                    .any(|f| f.as_str().eq_ignore_ascii_case(g.as_str()))
            })
    }

    pub fn active_items(&self, master: &[Item]) -> Vec<Item> {
        master.iter().filter(|i| self.matches(i)).cloned().collect()
    }
}
