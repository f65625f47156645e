use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Directory that receives raw uploaded videos
    #[arg(long, env = "HELMET_ANNOTATOR_UPLOADS_DIR", default_value = "uploads")]
    pub uploads_dir: PathBuf,

    /// Root directory served under /static; annotated videos land in its results/ folder
    #[arg(long, env = "HELMET_ANNOTATOR_STATIC_ROOT", default_value = "static")]
    pub static_root: PathBuf,

    /// Detection model weights
    #[arg(long, env = "HELMET_ANNOTATOR_MODEL_PATH", default_value = "best.onnx")]
    pub model_path: String,

    /// Class names of the detection model, in class-id order
    #[arg(
        long,
        env = "HELMET_ANNOTATOR_CLASS_NAMES",
        value_delimiter = ',',
        default_value = "helmet,head"
    )]
    pub class_names: Vec<String>,

    /// Minimum confidence for a detection to be drawn
    #[arg(long, env = "HELMET_ANNOTATOR_CONFIDENCE", default_value_t = 0.25)]
    pub confidence: f32,

    /// Maximum number of frames annotated per upload
    #[arg(long, env = "HELMET_ANNOTATOR_MAX_FRAMES", default_value_t = 300)]
    pub max_frames: usize,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["helmet-annotator"]).unwrap();
        assert_eq!(args.port, 5000);
        assert_eq!(args.max_frames, 300);
        assert_eq!(args.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(args.static_root, PathBuf::from("static"));
        assert_eq!(args.class_names, vec!["helmet", "head"]);
    }

    #[test]
    fn test_class_names_split_on_commas() {
        let args =
            Args::try_parse_from(["helmet-annotator", "--class-names", "hardhat,vest,person"])
                .unwrap();
        assert_eq!(args.class_names, vec!["hardhat", "vest", "person"]);
    }
}
