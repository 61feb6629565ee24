mod modules;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    modules::run()
}
