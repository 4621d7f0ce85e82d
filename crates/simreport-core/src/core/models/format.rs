use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Format tag under which analysis files are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
    /// Comma-separated tabular data that has to be plotted before it can be shown.
    Csv,
    Other(String),
}

impl FileFormat {
    /// Static raster formats in the order they are placed in the analysis grid.
    pub const STATIC_IMAGE_ORDER: [FileFormat; 4] =
        [FileFormat::Jpeg, FileFormat::Png, FileFormat::Bmp, FileFormat::Gif];

    pub fn is_static_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::Bmp | Self::Gif)
    }

    pub fn requires_plotting(&self) -> bool {
        matches!(self, Self::Csv)
    }

    /// Infers the format from a file extension. Files without an extension are `Other("")`.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let Ok(format) = ext.parse();
        format
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Csv => "csv",
            Self::Other(tag) => tag,
        }
    }
}

impl FromStr for FileFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "bmp" => Self::Bmp,
            "gif" => Self::Gif,
            "csv" => Self::Csv,
            _ => Self::Other(tag),
        })
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
