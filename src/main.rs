fn main() {
    glint::run();
}
