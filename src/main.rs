fn main() {
    xpreview::start();
}
