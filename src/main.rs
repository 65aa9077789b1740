fn main() -> anyhow::Result<()> {
    click_labeler::app::run()
}
