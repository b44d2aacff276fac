//! Built-in identifier kinds for artifacts of external module components

use super::ArtifactIdentifier;
use crate::codec::{CodecResult, Decoder, Encoder, Serializer};
use crate::error::{ArtcacheError, ArtcacheResult};
use serde::Serialize;
use std::fmt;

/// `group:module:version` coordinates of an external module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleComponentIdentifier {
    pub group: String,
    pub module: String,
    pub version: String,
}

impl ModuleComponentIdentifier {
    pub fn new(
        group: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            module: module.into(),
            version: version.into(),
        }
    }

    /// Parse `group:module:version`
    pub fn parse(coordinates: &str) -> ArtcacheResult<Self> {
        match coordinates.split(':').collect::<Vec<_>>().as_slice() {
            [group, module, version]
                if !group.is_empty() && !module.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(*group, *module, *version))
            }
            _ => Err(ArtcacheError::InvalidIdentifier(format!(
                "expected group:module:version, got '{}'",
                coordinates
            ))),
        }
    }
}

impl fmt::Display for ModuleComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.module, self.version)
    }
}

/// Name, type, extension and classifier of a published artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IvyArtifactName {
    pub name: String,
    pub artifact_type: String,
    pub extension: Option<String>,
    pub classifier: Option<String>,
}

impl IvyArtifactName {
    /// Artifact whose extension matches its type
    pub fn new(name: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        let artifact_type = artifact_type.into();
        Self {
            name: name.into(),
            extension: Some(artifact_type.clone()),
            artifact_type,
            classifier: None,
        }
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Parse `name:type[:extension[:classifier]]`
    ///
    /// An empty extension segment means the artifact has no extension.
    pub fn parse(spec: &str) -> ArtcacheResult<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        match parts.as_slice() {
            [name, artifact_type] if !name.is_empty() && !artifact_type.is_empty() => {
                Ok(Self::new(*name, *artifact_type))
            }
            [name, artifact_type, extension] if !name.is_empty() && !artifact_type.is_empty() => {
                Ok(Self::new(*name, *artifact_type).with_extension(non_empty(*extension)))
            }
            [name, artifact_type, extension, classifier]
                if !name.is_empty() && !artifact_type.is_empty() =>
            {
                Ok(Self::new(*name, *artifact_type)
                    .with_extension(non_empty(*extension))
                    .with_classifier(non_empty(*classifier)))
            }
            _ => Err(ArtcacheError::InvalidIdentifier(format!(
                "expected name:type[:extension[:classifier]], got '{}'",
                spec
            ))),
        }
    }
}

impl fmt::Display for IvyArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(classifier) = &self.classifier {
            write!(f, "-{}", classifier)?;
        }
        if let Some(extension) = &self.extension {
            write!(f, ".{}", extension)?;
        }
        Ok(())
    }
}

/// An artifact of a module component, addressed by its artifact name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleComponentArtifactIdentifier {
    pub component: ModuleComponentIdentifier,
    pub name: IvyArtifactName,
}

impl ModuleComponentArtifactIdentifier {
    pub fn new(component: ModuleComponentIdentifier, name: IvyArtifactName) -> Self {
        Self { component, name }
    }

    /// File name the artifact is published under: `module-version[-classifier][.ext]`
    pub fn file_name(&self) -> String {
        let mut file_name = format!("{}-{}", self.name.name, self.component.version);
        if let Some(classifier) = &self.name.classifier {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        if let Some(extension) = &self.name.extension {
            file_name.push('.');
            file_name.push_str(extension);
        }
        file_name
    }
}

impl fmt::Display for ModuleComponentArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.component)
    }
}

impl ArtifactIdentifier for ModuleComponentArtifactIdentifier {}

/// An artifact of a module component, addressed by file name only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleComponentFileArtifactIdentifier {
    pub component: ModuleComponentIdentifier,
    pub file_name: String,
}

impl ModuleComponentFileArtifactIdentifier {
    pub fn new(component: ModuleComponentIdentifier, file_name: impl Into<String>) -> Self {
        Self {
            component,
            file_name: file_name.into(),
        }
    }
}

impl fmt::Display for ModuleComponentFileArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.component)
    }
}

impl ArtifactIdentifier for ModuleComponentFileArtifactIdentifier {}

fn write_component(encoder: &mut dyn Encoder, component: &ModuleComponentIdentifier) -> CodecResult<()> {
    encoder.write_string(&component.group)?;
    encoder.write_string(&component.module)?;
    encoder.write_string(&component.version)
}

fn read_component(decoder: &mut dyn Decoder) -> CodecResult<ModuleComponentIdentifier> {
    let group = decoder.read_string()?;
    let module = decoder.read_string()?;
    let version = decoder.read_string()?;
    Ok(ModuleComponentIdentifier::new(group, module, version))
}

/// Payload: group, module, version, name, type, nullable extension, nullable classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleComponentArtifactIdentifierSerializer;

impl Serializer<ModuleComponentArtifactIdentifier> for ModuleComponentArtifactIdentifierSerializer {
    fn write(
        &self,
        encoder: &mut dyn Encoder,
        value: &ModuleComponentArtifactIdentifier,
    ) -> CodecResult<()> {
        write_component(encoder, &value.component)?;
        encoder.write_string(&value.name.name)?;
        encoder.write_string(&value.name.artifact_type)?;
        encoder.write_nullable_string(value.name.extension.as_deref())?;
        encoder.write_nullable_string(value.name.classifier.as_deref())
    }

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<ModuleComponentArtifactIdentifier> {
        let component = read_component(decoder)?;
        let name = decoder.read_string()?;
        let artifact_type = decoder.read_string()?;
        let extension = decoder.read_nullable_string()?;
        let classifier = decoder.read_nullable_string()?;
        Ok(ModuleComponentArtifactIdentifier::new(
            component,
            IvyArtifactName {
                name,
                artifact_type,
                extension,
                classifier,
            },
        ))
    }
}

/// Payload: group, module, version, file name
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleComponentFileArtifactIdentifierSerializer;

impl Serializer<ModuleComponentFileArtifactIdentifier>
    for ModuleComponentFileArtifactIdentifierSerializer
{
    fn write(
        &self,
        encoder: &mut dyn Encoder,
        value: &ModuleComponentFileArtifactIdentifier,
    ) -> CodecResult<()> {
        write_component(encoder, &value.component)?;
        encoder.write_string(&value.file_name)
    }

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<ModuleComponentFileArtifactIdentifier> {
        let component = read_component(decoder)?;
        let file_name = decoder.read_string()?;
        Ok(ModuleComponentFileArtifactIdentifier::new(component, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    fn component() -> ModuleComponentIdentifier {
        ModuleComponentIdentifier::new("org.example", "lib", "1.2")
    }

    #[test]
    fn parse_component() {
        let id = ModuleComponentIdentifier::parse("org.example:lib:1.2").unwrap();
        assert_eq!(id, component());
        assert_eq!(id.to_string(), "org.example:lib:1.2");
    }

    #[test]
    fn parse_component_rejects_bad_coordinates() {
        assert!(ModuleComponentIdentifier::parse("org.example:lib").is_err());
        assert!(ModuleComponentIdentifier::parse("org.example::1.2").is_err());
        assert!(ModuleComponentIdentifier::parse("a:b:c:d").is_err());
    }

    #[test]
    fn parse_artifact_name_variants() {
        let jar = IvyArtifactName::parse("lib:jar").unwrap();
        assert_eq!(jar.extension.as_deref(), Some("jar"));
        assert_eq!(jar.classifier, None);

        let sources = IvyArtifactName::parse("lib:source:jar:sources").unwrap();
        assert_eq!(sources.artifact_type, "source");
        assert_eq!(sources.classifier.as_deref(), Some("sources"));
        assert_eq!(sources.to_string(), "lib-sources.jar");

        let bare = IvyArtifactName::parse("lib:bundle::").unwrap();
        assert_eq!(bare.extension, None);
        assert_eq!(bare.to_string(), "lib");

        assert!(IvyArtifactName::parse("lib").is_err());
    }

    #[test]
    fn artifact_file_name() {
        let id = ModuleComponentArtifactIdentifier::new(
            component(),
            IvyArtifactName::new("lib", "jar").with_classifier(Some("tests".to_string())),
        );
        assert_eq!(id.file_name(), "lib-1.2-tests.jar");
        assert_eq!(id.to_string(), "lib-tests.jar (org.example:lib:1.2)");
    }

    #[test]
    fn artifact_serializer_keeps_absent_fields() {
        let id = ModuleComponentArtifactIdentifier::new(
            component(),
            IvyArtifactName::new("lib", "jar").with_extension(None),
        );
        let serializer = ModuleComponentArtifactIdentifierSerializer;
        let bytes = to_bytes(&serializer, &id).unwrap();
        let decoded: ModuleComponentArtifactIdentifier = from_bytes(&serializer, &bytes).unwrap();
        assert_eq!(decoded, id);
        assert_eq!(decoded.name.extension, None);
    }

    #[test]
    fn file_serializer_payload_layout() {
        let id = ModuleComponentFileArtifactIdentifier::new(
            ModuleComponentIdentifier::new("g", "m", "1"),
            "m-1.pom",
        );
        let bytes = to_bytes(&ModuleComponentFileArtifactIdentifierSerializer, &id).unwrap();
        let mut expected = vec![1, b'g', 1, b'm', 1, b'1', 7];
        expected.extend_from_slice(b"m-1.pom");
        assert_eq!(bytes, expected);
    }
}
