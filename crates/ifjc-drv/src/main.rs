fn main() {
    std::process::exit(ifjc_drv::run());
}
