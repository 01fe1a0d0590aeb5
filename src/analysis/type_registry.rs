use crate::models::TypeRef;
use crate::scene::SceneTree;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
}

/// A capability type known at resolution time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub kind: TypeKind,
    /// Whether instances can be attached to a node
    pub bindable: bool,
}

impl TypeInfo {
    pub fn concrete(qualified: &str) -> Self {
        Self {
            type_ref: TypeRef::parse(qualified),
            kind: TypeKind::Concrete,
            bindable: true,
        }
    }

    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn not_bindable(mut self) -> Self {
        self.bindable = false;
        self
    }

    pub fn is_attachable(&self) -> bool {
        self.bindable && self.kind == TypeKind::Concrete
    }
}

/// Supplies the candidate types a [`TypeRegistry`] indexes
pub trait TypeSource {
    fn scan(&self) -> Vec<TypeInfo>;
}

/// A fixed list of types
#[derive(Debug, Clone, Default)]
pub struct StaticTypeSource {
    types: Vec<TypeInfo>,
}

impl StaticTypeSource {
    pub fn new(types: Vec<TypeInfo>) -> Self {
        Self { types }
    }

    pub fn from_names<'a>(qualified: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(qualified.into_iter().map(TypeInfo::concrete).collect())
    }
}

impl TypeSource for StaticTypeSource {
    fn scan(&self) -> Vec<TypeInfo> {
        self.types.clone()
    }
}

/// Common engine UI capability types, plus the abstract bases that must never be offered
pub fn builtin_ui_types() -> StaticTypeSource {
    let mut types: Vec<TypeInfo> = [
        "UnityEngine.Transform",
        "UnityEngine.RectTransform",
        "UnityEngine.Canvas",
        "UnityEngine.CanvasGroup",
        "UnityEngine.Animator",
        "UnityEngine.AudioSource",
        "UnityEngine.Camera",
        "UnityEngine.UI.Button",
        "UnityEngine.UI.Text",
        "UnityEngine.UI.Image",
        "UnityEngine.UI.RawImage",
        "UnityEngine.UI.Toggle",
        "UnityEngine.UI.ToggleGroup",
        "UnityEngine.UI.Slider",
        "UnityEngine.UI.Scrollbar",
        "UnityEngine.UI.Dropdown",
        "UnityEngine.UI.InputField",
        "UnityEngine.UI.ScrollRect",
        "UnityEngine.UI.Mask",
        "UnityEngine.UI.RectMask2D",
        "UnityEngine.UI.GridLayoutGroup",
        "UnityEngine.UI.HorizontalLayoutGroup",
        "UnityEngine.UI.VerticalLayoutGroup",
        "UnityEngine.UI.LayoutElement",
        "UnityEngine.UI.ContentSizeFitter",
        "UnityEngine.UI.AspectRatioFitter",
        "UnityEngine.UI.CanvasScaler",
        "TMPro.TextMeshProUGUI",
        "TMPro.TMP_InputField",
        "TMPro.TMP_Dropdown",
    ]
    .into_iter()
    .map(TypeInfo::concrete)
    .collect();

    types.push(TypeInfo::concrete("UnityEngine.Component").with_kind(TypeKind::Abstract));
    types.push(TypeInfo::concrete("UnityEngine.Behaviour").with_kind(TypeKind::Abstract));
    types.push(TypeInfo::concrete("UnityEngine.UI.Selectable").with_kind(TypeKind::Abstract));
    types.push(TypeInfo::concrete("UnityEngine.UI.Graphic").with_kind(TypeKind::Abstract));
    types.push(
        TypeInfo::concrete("UnityEngine.EventSystems.IPointerClickHandler")
            .with_kind(TypeKind::Interface),
    );
    StaticTypeSource::new(types)
}

/// Every capability type attached somewhere in a scene
pub fn scene_types(tree: &SceneTree) -> StaticTypeSource {
    let mut seen: Vec<TypeRef> = Vec::new();
    for root in tree.roots() {
        for id in std::iter::once(root).chain(tree.descendants(root)) {
            for capability in tree.capabilities(id) {
                if !seen.contains(&capability.type_ref) {
                    seen.push(capability.type_ref.clone());
                }
            }
        }
    }
    StaticTypeSource::new(
        seen.into_iter()
            .map(|type_ref| TypeInfo {
                type_ref,
                kind: TypeKind::Concrete,
                bindable: true,
            })
            .collect(),
    )
}

/// Several sources scanned in order
#[derive(Default)]
pub struct LayeredTypeSource {
    layers: Vec<Box<dyn TypeSource>>,
}

impl LayeredTypeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, source: impl TypeSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl TypeSource for LayeredTypeSource {
    fn scan(&self) -> Vec<TypeInfo> {
        self.layers.iter().flat_map(|layer| layer.scan()).collect()
    }
}

/// Cached index of bindable capability types.
///
/// The first lookup scans the source; later lookups reuse the result until
/// [`TypeRegistry::invalidate`] is called, e.g. after a compilation added new types.
pub struct TypeRegistry {
    source: Box<dyn TypeSource>,
    cache: RefCell<Option<Vec<TypeInfo>>>,
    scans: Cell<usize>,
}

impl TypeRegistry {
    pub fn new(source: impl TypeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: RefCell::new(None),
            scans: Cell::new(0),
        }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_ui_types())
    }

    /// Drop the cached scan so the next lookup rescans the source
    pub fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }

    /// How many times the source has been scanned
    pub fn scan_count(&self) -> usize {
        self.scans.get()
    }

    fn with_types<R>(&self, f: impl FnOnce(&[TypeInfo]) -> R) -> R {
        if self.cache.borrow().is_none() {
            let mut types: Vec<TypeInfo> = Vec::new();
            for info in self.source.scan() {
                if info.is_attachable() && !types.iter().any(|t| t.type_ref == info.type_ref) {
                    types.push(info);
                }
            }
            types.sort_by(|a, b| {
                a.type_ref
                    .namespace
                    .cmp(&b.type_ref.namespace)
                    .then_with(|| a.type_ref.name.cmp(&b.type_ref.name))
            });
            self.scans.set(self.scans.get() + 1);
            *self.cache.borrow_mut() = Some(types);
        }
        let cache = self.cache.borrow();
        f(cache.as_deref().unwrap_or_default())
    }

    /// Look a type up by qualified name first, then by simple name. Case-insensitive.
    pub fn find_type(&self, simple_or_qualified: &str) -> Option<TypeInfo> {
        let wanted = simple_or_qualified.trim();
        if wanted.is_empty() {
            return None;
        }
        self.with_types(|types| {
            types
                .iter()
                .find(|t| t.type_ref.qualified().eq_ignore_ascii_case(wanted))
                .or_else(|| {
                    types
                        .iter()
                        .find(|t| t.type_ref.name.eq_ignore_ascii_case(wanted))
                })
                .cloned()
        })
    }

    /// Case-insensitive substring search over simple name, namespace and qualified name.
    ///
    /// Results are ordered by namespace, then simple name. An empty query returns every type.
    pub fn search(&self, query: &str) -> Vec<TypeInfo> {
        let needle = query.trim().to_lowercase();
        self.with_types(|types| {
            types
                .iter()
                .filter(|t| {
                    needle.is_empty()
                        || t.type_ref.name.to_lowercase().contains(&needle)
                        || t.type_ref.namespace.to_lowercase().contains(&needle)
                        || t.type_ref.qualified().to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.with_types(|types| types.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
