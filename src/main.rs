use flowtag::app::Application;

fn main() {
    let app = Application::prepare();
    std::process::exit(app.run());
}
