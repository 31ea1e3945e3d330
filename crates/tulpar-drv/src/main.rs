fn main() -> anyhow::Result<()> {
    tulpar_drv::main()
}
