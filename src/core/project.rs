//! In-memory model of an IDE project document.
//!
//! A project is a tree of groups holding file references, plus a list of
//! native targets. Each target owns its build configurations and its build
//! phases. Objects are addressed by opaque [`ObjectId`]s; link phases refer to
//! file references by id.
//!
//! Documents are persisted as pretty-printed JSON. Fields and phase kinds
//! the model does not know are kept as raw JSON and written back unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::util::{fs, hash};

/// Top-level group receiving linked libraries in the consumer project.
pub const FRAMEWORKS_GROUP: &str = "Frameworks";

/// Top-level group holding build products in the sandbox project.
pub const PRODUCTS_GROUP: &str = "Products";

/// Sentinel in a build setting meaning "also apply the inherited value".
pub const INHERITED: &str = "$(inherited)";

const DEFAULT_SHELL_PATH: &str = "/bin/sh";

/// Opaque identifier of an object inside a project document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    /// Derive a 24-character id from a seed and an attempt counter.
    pub fn derive(seed: &str, attempt: u32) -> Self {
        let attempt = attempt.to_string();
        let digest = hash::sha256_parts([seed, attempt.as_str()]);
        ObjectId(digest[..24].to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        ObjectId::new(s)
    }
}

/// Where a newly created element goes in an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

/// Find the first item matching `pred`, or insert the one built by `make`.
///
/// Returns the index of the item and whether it was inserted.
pub fn find_or_insert<T>(
    items: &mut Vec<T>,
    pred: impl Fn(&T) -> bool,
    placement: Placement,
    make: impl FnOnce() -> T,
) -> (usize, bool) {
    if let Some(index) = items.iter().position(pred) {
        return (index, false);
    }

    match placement {
        Placement::Front => {
            items.insert(0, make());
            (0, true)
        }
        Placement::Back => {
            items.push(make());
            (items.len() - 1, true)
        }
    }
}

/// Base location a file reference path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceTree {
    #[default]
    #[serde(rename = "<group>")]
    Group,
    #[serde(rename = "SOURCE_ROOT")]
    SourceRoot,
    #[serde(rename = "BUILT_PRODUCTS_DIR")]
    BuiltProducts,
}

/// A path-addressed file node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub id: ObjectId,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub source_tree: SourceTree,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileReference {
    pub fn new(id: ObjectId, path: impl Into<String>, source_tree: SourceTree) -> Self {
        FileReference {
            id,
            path: path.into(),
            name: None,
            source_tree,
            extra: Map::new(),
        }
    }
}

/// A node of the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileReference>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Group {
            id,
            name: name.into(),
            files: Vec::new(),
            groups: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Direct child reference with the given path.
    pub fn file_by_path(&self, path: &str) -> Option<&FileReference> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Look up a direct child reference by path, creating it with `id` if absent.
    pub fn file_reference_or_create(
        &mut self,
        path: &str,
        id: ObjectId,
        source_tree: SourceTree,
    ) -> (&FileReference, bool) {
        let (index, created) = find_or_insert(
            &mut self.files,
            |f| f.path == path,
            Placement::Back,
            || FileReference::new(id, path, source_tree),
        );
        (&self.files[index], created)
    }

    fn contains_id(&self, id: &ObjectId) -> bool {
        &self.id == id
            || self.files.iter().any(|f| &f.id == id)
            || self.groups.iter().any(|g| g.contains_id(id))
    }
}

/// A build setting value: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    List(Vec<String>),
}

impl SettingValue {
    /// Whether `token` occurs in the value (in any element for lists).
    pub fn contains(&self, token: &str) -> bool {
        match self {
            SettingValue::String(s) => s.contains(token),
            SettingValue::List(items) => items.iter().any(|item| item.contains(token)),
        }
    }

    /// Whether the value pulls in the inherited setting.
    pub fn inherits(&self) -> bool {
        self.contains(INHERITED)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => f.write_str(s),
            SettingValue::List(items) => f.write_str(&items.join(" ")),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

/// A named set of build settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub name: String,
    #[serde(default)]
    pub build_settings: BTreeMap<String, SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_configuration_reference: Option<ObjectId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        BuildConfiguration {
            name: name.into(),
            build_settings: BTreeMap::new(),
            base_configuration_reference: None,
            extra: Map::new(),
        }
    }

    /// Value set directly on this configuration.
    pub fn setting(&self, key: &str) -> Option<&SettingValue> {
        self.build_settings.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.build_settings.insert(key.into(), value.into());
    }
}

/// A phase holding an ordered list of file references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesPhase {
    pub id: ObjectId,
    #[serde(default)]
    pub files: Vec<ObjectId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FilesPhase {
    pub fn new(id: ObjectId) -> Self {
        FilesPhase {
            id,
            files: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn contains(&self, file: &ObjectId) -> bool {
        self.files.contains(file)
    }

    /// Append `file` unless already present. Returns whether it was added.
    pub fn add_file(&mut self, file: ObjectId) -> bool {
        if self.contains(&file) {
            return false;
        }
        self.files.push(file);
        true
    }
}

/// A phase that runs a shell script during the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellScriptPhase {
    pub id: ObjectId,
    pub name: String,
    #[serde(default = "default_shell_path")]
    pub shell_path: String,
    #[serde(default)]
    pub shell_script: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_shell_path() -> String {
    DEFAULT_SHELL_PATH.to_string()
}

impl ShellScriptPhase {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        ShellScriptPhase {
            id,
            name: name.into(),
            shell_path: default_shell_path(),
            shell_script: String::new(),
            extra: Map::new(),
        }
    }
}

/// A phase kind the model does not interpret, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherPhase {
    pub isa: String,
    pub id: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A build phase of a native target, tagged by `isa` in documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPhase {
    Frameworks(FilesPhase),
    Sources(FilesPhase),
    Resources(FilesPhase),
    ShellScript(ShellScriptPhase),
    Other(OtherPhase),
}

const FRAMEWORKS_ISA: &str = "PBXFrameworksBuildPhase";
const SOURCES_ISA: &str = "PBXSourcesBuildPhase";
const RESOURCES_ISA: &str = "PBXResourcesBuildPhase";
const SHELL_SCRIPT_ISA: &str = "PBXShellScriptBuildPhase";

#[derive(Serialize)]
#[serde(tag = "isa")]
enum KnownPhaseRef<'a> {
    #[serde(rename = "PBXFrameworksBuildPhase")]
    Frameworks(&'a FilesPhase),
    #[serde(rename = "PBXSourcesBuildPhase")]
    Sources(&'a FilesPhase),
    #[serde(rename = "PBXResourcesBuildPhase")]
    Resources(&'a FilesPhase),
    #[serde(rename = "PBXShellScriptBuildPhase")]
    ShellScript(&'a ShellScriptPhase),
}

impl Serialize for BuildPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BuildPhase::Frameworks(p) => KnownPhaseRef::Frameworks(p).serialize(serializer),
            BuildPhase::Sources(p) => KnownPhaseRef::Sources(p).serialize(serializer),
            BuildPhase::Resources(p) => KnownPhaseRef::Resources(p).serialize(serializer),
            BuildPhase::ShellScript(p) => KnownPhaseRef::ShellScript(p).serialize(serializer),
            BuildPhase::Other(p) => p.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BuildPhase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut value = Map::<String, Value>::deserialize(deserializer)?;
        let isa = match value.get("isa") {
            Some(Value::String(isa)) => isa.clone(),
            _ => return Err(D::Error::missing_field("isa")),
        };

        let known = matches!(
            isa.as_str(),
            FRAMEWORKS_ISA | SOURCES_ISA | RESOURCES_ISA | SHELL_SCRIPT_ISA
        );
        if known {
            value.remove("isa");
        }
        let value = Value::Object(value);

        fn parse<T: DeserializeOwned, E: serde::de::Error>(value: Value) -> std::result::Result<T, E> {
            serde_json::from_value(value).map_err(E::custom)
        }
        Ok(match isa.as_str() {
            FRAMEWORKS_ISA => BuildPhase::Frameworks(parse(value)?),
            SOURCES_ISA => BuildPhase::Sources(parse(value)?),
            RESOURCES_ISA => BuildPhase::Resources(parse(value)?),
            SHELL_SCRIPT_ISA => BuildPhase::ShellScript(parse(value)?),
            _ => BuildPhase::Other(parse(value)?),
        })
    }
}

impl BuildPhase {
    pub fn id(&self) -> &ObjectId {
        match self {
            BuildPhase::Frameworks(p) | BuildPhase::Sources(p) | BuildPhase::Resources(p) => &p.id,
            BuildPhase::ShellScript(p) => &p.id,
            BuildPhase::Other(p) => &p.id,
        }
    }

    pub fn is_frameworks(&self) -> bool {
        matches!(self, BuildPhase::Frameworks(_))
    }

    pub fn as_shell_script(&self) -> Option<&ShellScriptPhase> {
        match self {
            BuildPhase::ShellScript(p) => Some(p),
            _ => None,
        }
    }

    fn is_shell_script_named(&self, name: &str) -> bool {
        self.as_shell_script().is_some_and(|p| p.name == name)
    }
}

/// A buildable product node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTarget {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_reference: Option<ObjectId>,
    #[serde(default)]
    pub build_configurations: Vec<BuildConfiguration>,
    #[serde(default)]
    pub build_phases: Vec<BuildPhase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NativeTarget {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        NativeTarget {
            id,
            name: name.into(),
            product_reference: None,
            build_configurations: Vec::new(),
            build_phases: Vec::new(),
            extra: Map::new(),
        }
    }

    /// The (single) link phase, if the target has one.
    pub fn frameworks_phase(&self) -> Option<&FilesPhase> {
        self.build_phases.iter().find_map(|p| match p {
            BuildPhase::Frameworks(phase) => Some(phase),
            _ => None,
        })
    }

    /// The link phase, appended with `id` if the target has none.
    pub fn frameworks_phase_or_create(&mut self, id: ObjectId) -> &mut FilesPhase {
        let (index, _) = find_or_insert(
            &mut self.build_phases,
            BuildPhase::is_frameworks,
            Placement::Back,
            || BuildPhase::Frameworks(FilesPhase::new(id)),
        );
        match &mut self.build_phases[index] {
            BuildPhase::Frameworks(phase) => phase,
            _ => unreachable!("predicate only matches frameworks phases"),
        }
    }

    /// Whether the link phase references `file`.
    pub fn links(&self, file: &ObjectId) -> bool {
        self.frameworks_phase().is_some_and(|p| p.contains(file))
    }

    pub fn shell_script_phases(&self) -> impl Iterator<Item = &ShellScriptPhase> {
        self.build_phases.iter().filter_map(BuildPhase::as_shell_script)
    }

    pub fn shell_script_phase(&self, name: &str) -> Option<&ShellScriptPhase> {
        self.shell_script_phases().find(|p| p.name == name)
    }

    /// Position of the script phase named `name` in the phase list.
    pub fn shell_script_phase_index(&self, name: &str) -> Option<usize> {
        self.build_phases
            .iter()
            .position(|p| p.is_shell_script_named(name))
    }

    /// Look up the script phase named `name`, creating it with `id` at
    /// `placement` if absent. Returns the phase and whether it was created.
    pub fn shell_script_phase_or_create(
        &mut self,
        name: &str,
        id: ObjectId,
        placement: Placement,
    ) -> (&mut ShellScriptPhase, bool) {
        let (index, created) = find_or_insert(
            &mut self.build_phases,
            |p| p.is_shell_script_named(name),
            placement,
            || BuildPhase::ShellScript(ShellScriptPhase::new(id, name)),
        );
        match &mut self.build_phases[index] {
            BuildPhase::ShellScript(phase) => (phase, created),
            _ => unreachable!("predicate only matches shell script phases"),
        }
    }

    pub fn configuration(&self, name: &str) -> Option<&BuildConfiguration> {
        self.build_configurations.iter().find(|c| c.name == name)
    }

    pub fn configuration_mut(&mut self, name: &str) -> Option<&mut BuildConfiguration> {
        self.build_configurations.iter_mut().find(|c| c.name == name)
    }

    fn contains_id(&self, id: &ObjectId) -> bool {
        &self.id == id || self.build_phases.iter().any(|p| p.id() == id)
    }
}

/// A project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip)]
    path: PathBuf,
    pub main_group: Group,
    #[serde(default)]
    pub targets: Vec<NativeTarget>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Create an empty project that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let main_group_id = ObjectId::derive(&format!("group:main:{}", path.display()), 0);
        Project {
            path,
            main_group: Group::new(main_group_id, ""),
            targets: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Load a project document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut project: Project = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse project document: {}", path.display()))?;
        project.path = path.to_path_buf();
        Ok(project)
    }

    /// Write the document back to the path it was loaded from.
    pub fn save(&self) -> Result<()> {
        self.save_as(&self.path)
    }

    pub fn save_as(&self, path: &Path) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(self)
            .with_context(|| format!("failed to serialize project document: {}", path.display()))?;
        contents.push('\n');
        fs::write_string(path, &contents)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any object in the document carries `id`.
    pub fn contains_id(&self, id: &ObjectId) -> bool {
        self.main_group.contains_id(id) || self.targets.iter().any(|t| t.contains_id(id))
    }

    /// A fresh id derived from `seed` that is not yet used in this document.
    pub fn generate_id(&self, seed: &str) -> ObjectId {
        let mut attempt = 0;
        loop {
            let id = ObjectId::derive(seed, attempt);
            if !self.contains_id(&id) {
                return id;
            }
            attempt += 1;
        }
    }

    pub fn target(&self, id: &ObjectId) -> Option<&NativeTarget> {
        self.targets.iter().find(|t| &t.id == id)
    }

    pub fn target_mut(&mut self, id: &ObjectId) -> Option<&mut NativeTarget> {
        self.targets.iter_mut().find(|t| &t.id == id)
    }

    pub fn target_named(&self, name: &str) -> Option<&NativeTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn target_named_mut(&mut self, name: &str) -> Option<&mut NativeTarget> {
        self.targets.iter_mut().find(|t| t.name == name)
    }

    /// Add a native target with the given configurations and return its id.
    pub fn add_target(&mut self, name: &str, configurations: &[&str]) -> ObjectId {
        let id = self.generate_id(&format!("target:{name}"));
        let mut target = NativeTarget::new(id.clone(), name);
        target.build_configurations = configurations
            .iter()
            .map(|c| BuildConfiguration::new(*c))
            .collect();
        self.targets.push(target);
        id
    }

    /// Top-level child group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.main_group.groups.iter().find(|g| g.name == name)
    }

    /// Top-level child group by name, created if absent.
    pub fn group_or_create(&mut self, name: &str) -> &mut Group {
        let id = self.generate_id(&format!("group:{name}"));
        let (index, _) = find_or_insert(
            &mut self.main_group.groups,
            |g| g.name == name,
            Placement::Back,
            || Group::new(id, name),
        );
        &mut self.main_group.groups[index]
    }

    /// Look up or create the reference for `path`, either in the top-level
    /// file list (`group == None`) or in the named top-level group.
    pub fn file_reference_or_create(
        &mut self,
        group: Option<&str>,
        path: &str,
        source_tree: SourceTree,
    ) -> ObjectId {
        let id = self.generate_id(&format!("file:{}:{path}", group.unwrap_or("")));
        let group = match group {
            Some(name) => self.group_or_create(name),
            None => &mut self.main_group,
        };
        let (file, created) = group.file_reference_or_create(path, id, source_tree);
        if created {
            tracing::debug!("added file reference `{}` ({})", file.path, file.id);
        }
        file.id.clone()
    }
}
