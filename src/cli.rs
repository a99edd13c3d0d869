use clap::Parser;
use std::path::PathBuf;

/// Turns product images into store products and fills in Yoast SEO metadata.
#[derive(Parser, Debug)]
#[command(name = "wooh")]
#[command(about = "Tool that helps turn images into WooCommerce products")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Fill in Yoast SEO title and description for every product")]
    pub autofill: bool,

    #[arg(short, long, default_value = "wooh.yaml", help = "Custom config path")]
    pub config: PathBuf,

    #[arg(short, long, help = "Directory of images to turn into products")]
    pub images_path: Option<PathBuf>,

    #[arg(
        short = 'l',
        long = "list-product-meta",
        help = "List the SEO metadata of every product"
    )]
    pub list_product_meta: bool,

    #[arg(short, long, help = "Ask for confirmation before writing each product")]
    pub prompt: bool,

    #[arg(
        short = 'r',
        long = "reset-autofill",
        help = "Ignore the saved progress and process every product again"
    )]
    pub reset_autofill: bool,

    #[arg(long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl Cli {
    pub fn has_action(&self) -> bool {
        self.autofill || self.list_product_meta || self.images_path.is_some()
    }
}
